//! OS packages the OCR service needs on the host.

/// Interpreter runtime.
const PYTHON: &[&str] = &["python3", "python3-pip", "python3-venv", "python3-dev"];

/// Image codec and rendering libraries pulled in by OpenCV / Paddle.
const IMAGE: &[&str] = &[
    "libgl1",
    "libglib2.0-0",
    "libsm6",
    "libxext6",
    "libxrender1",
    "libgomp1",
    "libjpeg-dev",
    "libpng-dev",
];

/// PDF rasterisation for `pdf2image`.
const PDF: &[&str] = &["poppler-utils"];

const NETWORK: &[&str] = &["curl", "wget", "git", "ca-certificates"];

/// The full, fixed package list in install order.
#[must_use]
pub fn packages() -> Vec<&'static str> {
    [PYTHON, IMAGE, PDF, NETWORK].concat()
}

/// Arguments for a non-interactive `apt-get install`, run through `env` so
/// `DEBIAN_FRONTEND` reaches apt without touching our own environment.
#[must_use]
pub fn apt_install_args() -> Vec<&'static str> {
    let mut args = vec![
        "DEBIAN_FRONTEND=noninteractive",
        "apt-get",
        "install",
        "-y",
        "--no-install-recommends",
    ];
    args.extend(packages());
    args
}
