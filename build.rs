const ICON: &str = "assets/tripboard.ico";

fn main() {
    println!("cargo:rerun-if-changed={ICON}");
    let is_windows = std::env::var("CARGO_CFG_TARGET_OS")
        .map(|os| os == "windows")
        .unwrap_or(false);
    if !is_windows || !std::path::Path::new(ICON).exists() {
        return;
    }
    let mut res = winresource::WindowsResource::new();
    res.set_icon(ICON);
    if let Err(e) = res.compile() {
        println!("cargo:warning=could not embed {ICON}: {e}");
    }
}
