use once_cell::sync::Lazy;

static ENABLED: Lazy<bool> = Lazy::new(|| std::env::var_os("NO_COLOR").is_none());

pub const C_RESET: &str = "\x1b[0m";
pub const C_GRAY: &str = "\x1b[90m";
pub const C_RED: &str = "\x1b[31m";
pub const C_GREEN: &str = "\x1b[32m";
pub const C_YELLOW: &str = "\x1b[33m";
pub const C_CYAN: &str = "\x1b[36m";

/// Returns `code` unless `NO_COLOR` is set.
pub fn paint(code: &'static str) -> &'static str {
    if *ENABLED { code } else { "" }
}

pub fn log_info(msg: &str) {
    println!("{}[scaffold]{} {msg}", paint(C_GRAY), paint(C_RESET));
}

pub fn log_warn(msg: &str) {
    eprintln!(
        "{gray}[scaffold]{reset} {yellow}warn{reset} {msg}",
        gray = paint(C_GRAY),
        yellow = paint(C_YELLOW),
        reset = paint(C_RESET)
    );
}

pub fn log_error(msg: &str) {
    eprintln!(
        "{gray}[scaffold]{reset} {red}error{reset} {msg}",
        gray = paint(C_GRAY),
        red = paint(C_RED),
        reset = paint(C_RESET)
    );
}
