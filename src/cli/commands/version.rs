//! Version information display.

/// Print the package name and version.
pub fn run() {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");
    println!("{name} {version}");
}
