use super::styles;
use chrono::{Datelike, Local};
use colored::Colorize;
use pantry::commands::{CmdMessage, MessageLevel};
use pantry::error::Result;
use pantry::model::InventoryItem;
use pantry::view::ItemCard;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 72;
const APP_TITLE: &str = "Pantry Inventory";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// The whole page: header, optional search line, one card per item, footer.
pub(super) fn render_page(cards: &[ItemCard], search: &str) -> String {
    let mut out = String::new();

    let banner = format!("{:^width$}", APP_TITLE, width = LINE_WIDTH);
    out.push_str(&format!("{}\n\n", styles::HEADER.apply_to(banner)));

    if !search.is_empty() {
        out.push_str(&format!(
            "  {}\n\n",
            styles::SEARCH.apply_to(format!("Search: {}", search))
        ));
    }

    if cards.is_empty() {
        out.push_str("  No items found.\n");
    } else {
        for card in cards {
            out.push_str(&render_card(card));
        }
    }

    out.push('\n');
    out.push_str(&format!(
        "{}\n",
        styles::FOOTER.apply_to(format!(
            "© {} {}. All rights reserved.",
            Local::now().year(),
            APP_TITLE
        ))
    ));
    out
}

/// `  Title ............ [-] Quantity: 3 [+]` plus a photo line when the item
/// has one.
fn render_card(card: &ItemCard) -> String {
    let quantity = format!("Quantity: {}", card.quantity);
    let controls_width = "[-] ".width() + quantity.width() + " [+]".width();
    let left = "  ";
    let available = LINE_WIDTH.saturating_sub(left.width() + controls_width + 1);

    let title = truncate_to_width(&card.title, available);
    let padding = available.saturating_sub(title.width()) + 1;

    let minus = if card.can_decrement {
        styles::CONTROL.apply_to("[-]")
    } else {
        styles::CONTROL_DISABLED.apply_to("[-]")
    };

    let mut out = format!(
        "{}{}{}{} {} {}\n",
        left,
        styles::TITLE.apply_to(title),
        " ".repeat(padding),
        minus,
        styles::QUANTITY.apply_to(quantity),
        styles::CONTROL.apply_to("[+]"),
    );
    if let Some(url) = &card.image_url {
        out.push_str(&format!("    {}\n", styles::PHOTO.apply_to(url)));
    }
    out
}

pub(super) fn render_json(items: &[&InventoryItem]) -> Result<String> {
    Ok(serde_json::to_string_pretty(items)?)
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, quantity: i64, image: Option<&str>) -> ItemCard {
        ItemCard::from(&InventoryItem {
            name: name.into(),
            quantity,
            image_url: image.unwrap_or_default().into(),
        })
    }

    fn plain(s: &str) -> String {
        console::strip_ansi_codes(s).to_string()
    }

    #[test]
    fn empty_page_says_no_items() {
        let page = plain(&render_page(&[], ""));
        assert!(page.contains("Pantry Inventory"));
        assert!(page.contains("No items found."));
        assert!(page.contains("All rights reserved."));
    }

    #[test]
    fn cards_show_title_quantity_and_photo() {
        let page = plain(&render_page(
            &[card("apple", 3, None), card("tea", 1, Some("file:///tea.jpg"))],
            "",
        ));
        assert!(page.contains("Apple"));
        assert!(page.contains("Quantity: 3"));
        assert!(page.contains("    file:///tea.jpg"));
    }

    #[test]
    fn search_text_is_echoed() {
        let page = plain(&render_page(&[], "an"));
        assert!(page.contains("Search: an"));
    }

    #[test]
    fn card_lines_fit_the_page() {
        let long = "a".repeat(200);
        let line = plain(&render_card(&card(&long, 12, None)));
        assert_eq!(line.trim_end_matches('\n').width(), LINE_WIDTH);
        assert!(line.contains('…'));
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_to_width("jam", 10), "jam");
        assert_eq!(truncate_to_width("marmalade", 5), "marm…");
    }

    #[test]
    fn json_lists_items_with_camel_case_fields() {
        let item = InventoryItem {
            name: "apple".into(),
            quantity: 2,
            image_url: String::new(),
        };
        let json = render_json(&[&item]).unwrap();
        assert!(json.contains("\"imageUrl\": \"\""));
    }
}
