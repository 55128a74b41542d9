use colored::Colorize;

const LOG_LEVEL_WIDTH: usize = 7;

fn level(name: &str) -> String {
    format!("{:<width$}", name, width = LOG_LEVEL_WIDTH)
}

pub fn info(msg: &str) {
    println!("{} {msg}", level("info").blue().bold());
}

pub fn success(msg: &str) {
    println!("{} {msg}", level("success").green().bold());
}

pub fn warn(msg: &str) {
    eprintln!("{} {msg}", level("warning").yellow().bold());
}

pub fn error(msg: &str) {
    eprintln!("{} {msg}", level("error").red().bold());
}
