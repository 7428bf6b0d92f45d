//! Browser UI, compiled into the binary.

pub const INDEX_HTML: &str = include_str!("../../assets/index.html");
pub const SCRIPT_JS: &str = include_str!("../../assets/script.js");
pub const STYLE_CSS: &str = include_str!("../../assets/style.css");
