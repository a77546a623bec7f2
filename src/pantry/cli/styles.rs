use console::Style;
use once_cell::sync::Lazy;

pub static HEADER: Lazy<Style> = Lazy::new(|| Style::new().white().on_color256(23).bold());
pub static SEARCH: Lazy<Style> = Lazy::new(|| Style::new().italic());
pub static TITLE: Lazy<Style> = Lazy::new(|| Style::new().bold());
pub static QUANTITY: Lazy<Style> = Lazy::new(|| Style::new().color256(245));
pub static CONTROL: Lazy<Style> = Lazy::new(|| Style::new().color256(220).bold());
pub static CONTROL_DISABLED: Lazy<Style> = Lazy::new(|| Style::new().dim());
pub static PHOTO: Lazy<Style> = Lazy::new(|| Style::new().cyan().dim());
pub static FOOTER: Lazy<Style> = Lazy::new(|| Style::new().dim());
