#![warn(clippy::all, rust_2018_idioms)]

fn main() -> eframe::Result {
    env_logger::init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("pdfsnip")
            .with_inner_size([1100.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "pdfsnip",
        native_options,
        Box::new(|cc| Ok(Box::new(pdfsnip::SnipApp::new(cc)))),
    )
}
