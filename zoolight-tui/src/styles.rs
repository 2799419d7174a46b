use ratatui::style::{Color, Modifier, Style};

pub fn banner() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(Color::Rgb(0, 77, 38))
        .add_modifier(Modifier::BOLD)
}

pub fn card_title() -> Style {
    Style::default()
        .fg(Color::LightGreen)
        .add_modifier(Modifier::BOLD)
}

pub fn detail_title() -> Style {
    Style::default()
        .fg(Color::LightGreen)
        .add_modifier(Modifier::BOLD | Modifier::ITALIC)
}

pub fn label() -> Style {
    Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD)
}

pub fn value() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

pub fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn focused_border() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::LightGreen)
        .add_modifier(Modifier::BOLD)
}

pub fn tree_node() -> Style {
    Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD)
}

pub fn button() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(0, 77, 38))
}

pub fn inert_button() -> Style {
    Style::default().fg(Color::Black).bg(Color::Gray)
}

pub fn back_button() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(Color::Rgb(231, 76, 60))
        .add_modifier(Modifier::BOLD)
}

pub fn error() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}
