use std::fmt::Display;

use colored::*;
use revmap_common::log::PRINT_TARGET;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

#[macro_export]
macro_rules! rprint {
    () => {
        $crate::terminal::print::print("")
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg)
    };
}

pub trait WithDefaultColor {
    fn with_default(self, default_color: Color) -> ColoredString;
}

impl WithDefaultColor for &str {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for String {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for ColoredString {
    fn with_default(self, _default_color: Color) -> ColoredString {
        self
    }
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn banner(no_banner: bool, q_level: u8) {
    if no_banner || q_level > 0 {
        return;
    }

    let text_content: String = format!("⟦ REVMAP v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.bright_green().bold();
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2).bright_black();
    print(&format!("{sep}{text}{sep}"));
    centerln(&format!("{}", "search → resolve → reverse".color(colors::SEPARATOR)));
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn aligned_line<V>(key: &str, key_width: usize, value: V)
where
    V: Display + WithDefaultColor,
{
    let dots: String = ".".repeat((key_width + 1).saturating_sub(key.len()));
    let colon: String = format!(
        "{}{}",
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR)
    );
    let value: ColoredString = value.with_default(colors::TEXT_DEFAULT);
    print_status(format!("{}{} {}", key.color(colors::PRIMARY), colon, value));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    let message: String = format!("{} {}", prefix, msg.as_ref().color(colors::TEXT_DEFAULT));
    print(&message);
}

/// Prints `items` as the branches of a one-level tree.
pub fn as_tree<T: AsRef<str>>(items: &[T]) {
    for (i, item) in items.iter().enumerate() {
        let branch: ColoredString = if i + 1 == items.len() {
            "└─".bright_black()
        } else {
            "├─".bright_black()
        };
        let idx: ColoredString = format!("{:2}.", i + 1).color(colors::SEPARATOR);
        print(&format!(" {} {} {}", branch, idx, item.as_ref()));
    }
}

/// A boxed key/value table.
pub fn summary_box(title: &str, rows: &[(&str, String)]) {
    let inner: usize = TOTAL_WIDTH - 2;
    let edge = |s: String| s.bright_magenta().bold();

    print(&format!("{}", edge(format!("┌{}┐", "─".repeat(inner)))));
    let title_pad: usize = inner.saturating_sub(title.chars().count());
    print(&format!(
        "{}{}{}{}{}",
        edge("│".into()),
        " ".repeat(title_pad / 2),
        title.bold(),
        " ".repeat(title_pad - title_pad / 2),
        edge("│".into())
    ));
    print(&format!("{}", edge(format!("├{}┤", "─".repeat(inner)))));

    for (label, value) in rows {
        let line: String = format!("  {label}: {value}");
        let pad: usize = inner.saturating_sub(console::measure_text_width(&line));
        print(&format!(
            "{}{}{}{}",
            edge("│".into()),
            line,
            " ".repeat(pad),
            edge("│".into())
        ));
    }
    print(&format!("{}", edge(format!("└{}┘", "─".repeat(inner)))));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}", space, msg));
}

pub fn no_results() {
    centerln(&format!("{}", "nothing new this time".red().bold()));
}

pub fn end_of_program() {
    print(&format!(
        "{}",
        "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)
    ));
}
