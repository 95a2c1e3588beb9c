use crate::catalog::{Book, ALL_CATEGORIES};
use crate::checkout::{Checkout, CheckoutPhase, OrderSummary, PaymentForm};
use crate::leaderboard::{self, POINTS_GOAL};
use crate::storage::{KeyValueStore, Theme};
use crate::store::LibraryStore;
use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::info;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::stdout;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_secs(1);
const MAX_LIST_ROWS: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq)]
enum View {
    Catalog,
    Details(String),
    Cart,
    Checkout,
    Reading,
    Leaderboard,
    Auth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    Login,
    Signup,
}

#[derive(Debug, Clone)]
struct AuthForm {
    mode: AuthMode,
    name: String,
    email: String,
    password: String,
    field: usize,
}

impl AuthForm {
    fn new() -> Self {
        Self {
            mode: AuthMode::Login,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            field: 0,
        }
    }

    fn field_count(&self) -> usize {
        match self.mode {
            AuthMode::Login => 2,
            AuthMode::Signup => 3,
        }
    }

    /// Name is only shown when signing up, so it is field 0 there.
    fn focused_mut(&mut self) -> &mut String {
        match (self.mode, self.field) {
            (AuthMode::Signup, 0) => &mut self.name,
            (AuthMode::Signup, 1) | (AuthMode::Login, 0) => &mut self.email,
            _ => &mut self.password,
        }
    }
}

struct Palette {
    bg: Color,
    fg: Color,
    accent: Color,
    muted: Color,
    warn: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Palette {
        match theme {
            Theme::Light => Palette {
                bg: Color::Rgb(250, 247, 240),
                fg: Color::Rgb(40, 40, 40),
                accent: Color::Rgb(79, 70, 229),
                muted: Color::Gray,
                warn: Color::Rgb(217, 119, 6),
            },
            Theme::Dark => Palette {
                bg: Color::Rgb(17, 24, 39),
                fg: Color::Rgb(229, 231, 235),
                accent: Color::Rgb(129, 140, 248),
                muted: Color::DarkGray,
                warn: Color::Yellow,
            },
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }
}

/// View state owned by the terminal front end. Everything durable lives in
/// the store.
struct Ui {
    view: View,
    selected: usize,
    cart_selected: usize,
    searching: bool,
    notice: Option<String>,
    auth: AuthForm,
    payment: PaymentForm,
    payment_field: usize,
    checkout: Option<Checkout>,
}

impl Ui {
    fn new() -> Self {
        Self {
            view: View::Catalog,
            selected: 0,
            cart_selected: 0,
            searching: false,
            notice: None,
            auth: AuthForm::new(),
            payment: PaymentForm::default(),
            payment_field: 0,
            checkout: None,
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }
}

fn draw_main_ui<S: KeyValueStore>(f: &mut Frame, store: &LibraryStore<S>, ui: &Ui) {
    let palette = Palette::for_theme(store.theme());
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // View
            Constraint::Length(3), // Quick Keys / notices
        ])
        .split(size);

    f.render_widget(Block::default().style(palette.base()), size);

    draw_header(f, chunks[0], store, &palette);

    match &ui.view {
        View::Catalog => draw_catalog(f, chunks[1], store, ui, &palette),
        View::Details(id) => match store.book(id) {
            Some(book) => draw_details(f, chunks[1], store, book, &palette),
            None => draw_catalog(f, chunks[1], store, ui, &palette),
        },
        View::Cart => draw_cart(f, chunks[1], store, ui, &palette),
        View::Checkout => draw_checkout(f, chunks[1], store, ui, &palette),
        View::Reading => draw_reading(f, chunks[1], store, &palette),
        View::Leaderboard => draw_leaderboard(f, chunks[1], store, &palette),
        View::Auth => draw_auth(f, chunks[1], ui, &palette),
    }

    let (text, style) = match &ui.notice {
        Some(notice) => (notice.clone(), Style::default().fg(palette.warn).bg(palette.bg)),
        None => (quick_keys(ui).to_string(), Style::default().fg(palette.muted).bg(palette.bg)),
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Menu Keys"))
        .style(style);
    f.render_widget(footer, chunks[2]);
}

fn quick_keys(ui: &Ui) -> &'static str {
    match ui.view {
        View::Catalog if ui.searching => "Type to search | [Enter]/[Esc] done | [Backspace] delete",
        View::Catalog => "[Q]uit | [↑↓] select | [Enter] details | [/] search | [C]ategory | [S]ort | [X] clear | [A]dd | [R]ead | [K] cart | [B]oard | [T]heme | [L]ogin/out",
        View::Details(_) => "[A]dd to cart | [R]ead online | [D]ownload | [Esc] back",
        View::Cart => "[↑↓] select | [D]elete | [C]lear | [Enter] checkout | [Esc] back",
        View::Checkout => "[↑↓] field | [←→] payment method | [Enter] pay | [Esc] cancel",
        View::Reading => "[←] prev page | [→] next page | [Home] start over | [Esc] save & exit",
        View::Leaderboard => "[Esc] back",
        View::Auth => "[Tab] login/sign up | [↑↓] field | [Enter] submit | [Esc] cancel",
    }
}

fn draw_header<S: KeyValueStore>(f: &mut Frame, area: Rect, store: &LibraryStore<S>, palette: &Palette) {
    let account = match store.user() {
        Some(user) => format!("{} | {} points", user.name, user.points),
        None => "Not logged in".to_string(),
    };
    let line = Line::from(vec![
        Span::styled("LibraryHub", Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
        Span::raw(format!("   Cart: {} | {}", store.cart_len(), account)),
    ]);
    let header = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL))
        .style(palette.base());
    f.render_widget(header, area);
}

fn draw_catalog<S: KeyValueStore>(
    f: &mut Frame,
    area: Rect,
    store: &LibraryStore<S>,
    ui: &Ui,
    palette: &Palette,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(area);

    let books = store.visible_books();
    let category = store.selected_category();
    let shown = if category == ALL_CATEGORIES {
        format!("Showing {} of {} books", books.len(), store.books().len())
    } else {
        format!("Showing {} {} books", books.len(), category)
    };
    let cursor = if ui.searching { "_" } else { "" };
    let filter_text = format!(
        "Category: {} | Search: {}{} | {} | {}",
        category,
        store.search_query(),
        cursor,
        store.sort_key().label(),
        shown
    );
    let filters = Paragraph::new(filter_text)
        .block(Block::default().borders(Borders::ALL).title("Filters"))
        .style(palette.base());
    f.render_widget(filters, rows[0]);

    if books.is_empty() {
        let empty = Paragraph::new("No books found.\n\nTry adjusting your search or filter.\nPress [X] to clear filters.")
            .block(Block::default().borders(Borders::ALL).title("Books"))
            .alignment(Alignment::Center)
            .style(palette.base());
        f.render_widget(empty, rows[1]);
        return;
    }

    let split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let selected = ui.selected.min(books.len() - 1);
    let start_index = selected.saturating_sub(MAX_LIST_ROWS / 2);
    let end_index = (start_index + MAX_LIST_ROWS).min(books.len());

    let mut lines = Vec::new();
    for (i, book) in books[start_index..end_index].iter().enumerate() {
        let marker = if i + start_index == selected { "=>" } else { "  " };
        let in_cart = if store.in_cart(&book.id) { " [in cart]" } else { "" };
        let text = format!(
            "{} {} by {}  ${:.2}  ★{:.1}{}",
            marker, book.title, book.author, book.price, book.rating, in_cart
        );
        let style = if i + start_index == selected {
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.fg)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }
    let list = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Books"))
        .style(palette.base());
    f.render_widget(list, split[0]);

    let book = books[selected];
    let preview = Paragraph::new(book_summary(book))
        .block(Block::default().borders(Borders::ALL).title("Preview"))
        .wrap(Wrap { trim: true })
        .style(palette.base());
    f.render_widget(preview, split[1]);
}

fn book_summary(book: &Book) -> String {
    format!(
        "{}\nby {}\n\n{}\n\nCategory: {}\nRating: {:.1}/5\nPages: {}\nReading time: {}h\nPrice: ${:.2}",
        book.title,
        book.author,
        book.description,
        book.category,
        book.rating,
        book.pages,
        book.reading_time,
        book.price
    )
}

fn draw_details<S: KeyValueStore>(
    f: &mut Frame,
    area: Rect,
    store: &LibraryStore<S>,
    book: &Book,
    palette: &Palette,
) {
    let mut text = book_summary(book);
    text.push_str(&format!("\nCover: {}", book.cover_image));
    if store.in_cart(&book.id) {
        text.push_str("\n\nAlready in your cart.");
    }
    if !store.is_logged_in() {
        text.push_str("\n\nPlease login to read online, download, or purchase this book.");
    }
    let details = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Book Details"))
        .wrap(Wrap { trim: true })
        .style(palette.base());
    f.render_widget(details, area);
}

fn draw_cart<S: KeyValueStore>(
    f: &mut Frame,
    area: Rect,
    store: &LibraryStore<S>,
    ui: &Ui,
    palette: &Palette,
) {
    let items = store.cart().items();
    let body = if items.is_empty() {
        Text::from("Your cart is empty\n\nAdd some books to get started with your reading journey!")
    } else {
        let mut lines: Vec<Line> = items
            .iter()
            .enumerate()
            .map(|(i, book)| {
                let marker = if i == ui.cart_selected { "=>" } else { "  " };
                Line::from(format!("{} {} by {}  ${:.2}", marker, book.title, book.author, book.price))
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Total: ${:.2}", store.cart_total()),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        )));
        Text::from(lines)
    };
    let cart = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title("Shopping Cart"))
        .style(palette.base());
    f.render_widget(cart, area);
}

fn draw_checkout<S: KeyValueStore>(
    f: &mut Frame,
    area: Rect,
    store: &LibraryStore<S>,
    ui: &Ui,
    palette: &Palette,
) {
    if let Some(checkout) = &ui.checkout {
        let text = match checkout.phase {
            CheckoutPhase::Processing { .. } => "Processing payment...".to_string(),
            CheckoutPhase::Succeeded { .. } | CheckoutPhase::Completed => format!(
                "Payment Successful!\n\nYour order has been placed successfully.\n\nOrder Total: ${:.2}\n{} item(s) purchased",
                checkout.order.total, checkout.order.item_count
            ),
        };
        let status = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Checkout"))
            .alignment(Alignment::Center)
            .style(palette.base());
        f.render_widget(status, area);
        return;
    }

    let split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let mut summary: Vec<String> = store
        .cart()
        .items()
        .iter()
        .map(|b| format!("{}  ${:.2}", b.title, b.price))
        .collect();
    summary.push(String::new());
    summary.push(format!("Total: ${:.2}", store.cart_total()));
    let order = Paragraph::new(summary.join("\n"))
        .block(Block::default().borders(Borders::ALL).title("Order Summary"))
        .style(palette.base());
    f.render_widget(order, split[0]);

    let mut lines = vec![Line::from(format!("Payment method: < {} >", ui.payment.method.label())), Line::from("")];
    for (i, field) in ui.payment.fields().into_iter().enumerate() {
        let marker = if i == ui.payment_field { "=>" } else { "  " };
        lines.push(Line::from(format!("{} {}: {}", marker, field.label(), ui.payment.value(field))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!("Complete Purchase - ${:.2}", store.cart_total())));
    let form = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Payment"))
        .style(palette.base());
    f.render_widget(form, split[1]);
}

fn draw_reading<S: KeyValueStore>(f: &mut Frame, area: Rect, store: &LibraryStore<S>, palette: &Palette) {
    let Some(session) = store.reading() else {
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    let header = format!(
        "{} by {} | {} | +{} points | started {}",
        session.book.title,
        session.book.author,
        session.elapsed_display(),
        session.points_earned,
        session.started.format("%H:%M")
    );
    f.render_widget(
        Paragraph::new(header)
            .block(Block::default().borders(Borders::ALL).title("Reading"))
            .style(palette.base()),
        rows[0],
    );

    let page_title = format!(
        "Chapter {} | Page {} of {}",
        session.chapter(),
        session.current_page,
        session.book.pages
    );
    f.render_widget(
        Paragraph::new(session.page_text())
            .block(Block::default().borders(Borders::ALL).title(page_title))
            .wrap(Wrap { trim: false })
            .style(palette.base()),
        rows[1],
    );

    // Includes minutes already credited to the user.
    let total = store
        .user()
        .map(|u| format!(" | Total Points: {}", u.points.saturating_add(session.points_earned)))
        .unwrap_or_default();
    f.render_widget(
        Paragraph::new(format!("Progress: {}%{}", session.progress_percent(), total))
            .block(Block::default().borders(Borders::ALL).title("Statistics"))
            .style(palette.base()),
        rows[2],
    );

    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(palette.accent).bg(palette.bg))
        .ratio(session.progress_ratio());
    f.render_widget(progress, rows[3]);
}

fn draw_leaderboard<S: KeyValueStore>(f: &mut Frame, area: Rect, store: &LibraryStore<S>, palette: &Palette) {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Race to {} points to win the grand prize!", POINTS_GOAL),
            Style::default().fg(palette.warn),
        )),
        Line::from(""),
    ];

    if let (Some(user), Some(rank)) = (store.user(), store.user_rank()) {
        lines.push(Line::from(format!("Your Position: #{} with {} points", rank, user.points)));
        lines.push(Line::from(""));
    }

    let email = store.user().map(|u| u.email.as_str());
    for (i, entry) in store.leaderboard().iter().enumerate() {
        let progress = leaderboard::progress_to_goal(entry.points);
        let filled = (progress / 5.0).round() as usize;
        let bar = format!("[{}{}]", "#".repeat(filled), "-".repeat(20 - filled));
        let winner = if leaderboard::is_winner(entry.points) { " WINNER" } else { "" };
        let text = format!(
            "#{} {:<16} {:>5} pts  {} books  {}h  {} {:.0}%{}",
            i + 1,
            entry.name,
            entry.points,
            entry.books_read,
            entry.reading_time,
            bar,
            progress,
            winner
        );
        let style = if email == Some(entry.email.as_str()) {
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.fg)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    let board = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Reading Contest Leaderboard"))
        .style(palette.base());
    f.render_widget(board, area);
}

fn draw_auth(f: &mut Frame, area: Rect, ui: &Ui, palette: &Palette) {
    let form = &ui.auth;
    let mut fields: Vec<(&str, String)> = Vec::new();
    if form.mode == AuthMode::Signup {
        fields.push(("Full Name", form.name.clone()));
    }
    fields.push(("Email", form.email.clone()));
    fields.push(("Password", "*".repeat(form.password.chars().count())));

    let mut lines = Vec::new();
    for (i, (label, value)) in fields.into_iter().enumerate() {
        let marker = if i == form.field { "=>" } else { "  " };
        lines.push(Line::from(format!("{} {}: {}", marker, label, value)));
    }

    let title = match form.mode {
        AuthMode::Login => "Welcome Back",
        AuthMode::Signup => "Join LibraryHub",
    };
    let panel = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(palette.base());
    f.render_widget(panel, area);
}

/// Applies one key press. Returns true when the app should quit.
fn handle_key<S: KeyValueStore>(store: &mut LibraryStore<S>, ui: &mut Ui, code: KeyCode) -> bool {
    ui.notice = None;

    match ui.view.clone() {
        View::Catalog if ui.searching => {
            let mut query = store.search_query().to_string();
            match code {
                KeyCode::Char(c) => query.push(c),
                KeyCode::Backspace => {
                    query.pop();
                }
                KeyCode::Enter | KeyCode::Esc => ui.searching = false,
                _ => {}
            }
            store.set_search_query(&query);
            ui.selected = 0;
        }
        View::Catalog => {
            let count = store.visible_books().len();
            let current = store.visible_books().get(ui.selected).map(|b| (*b).clone());
            match code {
                KeyCode::Char('q') => return true,
                KeyCode::Up => ui.selected = ui.selected.saturating_sub(1),
                KeyCode::Down => {
                    if ui.selected + 1 < count {
                        ui.selected += 1;
                    }
                }
                KeyCode::Enter => {
                    if let Some(book) = current {
                        ui.view = View::Details(book.id);
                    }
                }
                KeyCode::Char('/') => ui.searching = true,
                KeyCode::Char('c') => {
                    let categories = store.categories();
                    let at = categories
                        .iter()
                        .position(|c| c == store.selected_category())
                        .unwrap_or(0);
                    let next = categories[(at + 1) % categories.len()].clone();
                    store.set_selected_category(&next);
                    ui.selected = 0;
                }
                KeyCode::Char('s') => store.set_sort_key(store.sort_key().next()),
                KeyCode::Char('x') => {
                    store.clear_filters();
                    ui.selected = 0;
                }
                KeyCode::Char('a') => {
                    if let Some(book) = current {
                        add_to_cart(store, ui, &book);
                    }
                }
                KeyCode::Char('r') => {
                    if let Some(book) = current {
                        start_reading(store, ui, &book);
                    }
                }
                KeyCode::Char('k') => {
                    ui.cart_selected = 0;
                    ui.view = View::Cart;
                }
                KeyCode::Char('b') => ui.view = View::Leaderboard,
                KeyCode::Char('t') => store.toggle_theme(),
                KeyCode::Char('l') => {
                    if store.is_logged_in() {
                        store.logout();
                        ui.notify("Logged out");
                    } else {
                        ui.auth = AuthForm::new();
                        ui.view = View::Auth;
                    }
                }
                _ => {}
            }
        }
        View::Details(id) => {
            let Some(book) = store.book(&id).cloned() else {
                ui.view = View::Catalog;
                return false;
            };
            match code {
                KeyCode::Char('a') => add_to_cart(store, ui, &book),
                KeyCode::Char('r') => start_reading(store, ui, &book),
                KeyCode::Char('d') => {
                    if store.is_logged_in() {
                        ui.notify("Download feature coming soon!");
                    } else {
                        ui.notify("Please login to download books");
                    }
                }
                KeyCode::Esc | KeyCode::Char('q') => ui.view = View::Catalog,
                _ => {}
            }
        }
        View::Cart => {
            let count = store.cart_len();
            match code {
                KeyCode::Up => ui.cart_selected = ui.cart_selected.saturating_sub(1),
                KeyCode::Down => {
                    if ui.cart_selected + 1 < count {
                        ui.cart_selected += 1;
                    }
                }
                KeyCode::Char('d') | KeyCode::Delete => {
                    let id = store.cart().items().get(ui.cart_selected).map(|b| b.id.clone());
                    if let Some(id) = id {
                        store.remove_from_cart(&id);
                        ui.cart_selected = ui.cart_selected.min(store.cart_len().saturating_sub(1));
                    }
                }
                KeyCode::Char('c') => store.clear_cart(),
                KeyCode::Enter => {
                    if !store.is_logged_in() {
                        ui.notify("Please login to proceed with checkout");
                    } else if store.cart().is_empty() {
                        ui.notify("Your cart is empty");
                    } else {
                        ui.payment = PaymentForm::default();
                        ui.payment_field = 0;
                        ui.checkout = None;
                        ui.view = View::Checkout;
                    }
                }
                KeyCode::Esc | KeyCode::Char('q') => ui.view = View::Catalog,
                _ => {}
            }
        }
        View::Checkout => {
            if ui.checkout.is_some() {
                // The fake payment runs to completion on its own.
                return false;
            }
            let fields = ui.payment.fields();
            match code {
                KeyCode::Up => ui.payment_field = ui.payment_field.saturating_sub(1),
                KeyCode::Down | KeyCode::Tab => {
                    if ui.payment_field + 1 < fields.len() {
                        ui.payment_field += 1;
                    }
                }
                KeyCode::Left | KeyCode::Right => {
                    ui.payment.method = ui.payment.method.toggled();
                    ui.payment_field = 0;
                }
                KeyCode::Char(c) => {
                    if let Some(field) = fields.get(ui.payment_field) {
                        ui.payment.value_mut(*field).push(c);
                    }
                }
                KeyCode::Backspace => {
                    if let Some(field) = fields.get(ui.payment_field) {
                        ui.payment.value_mut(*field).pop();
                    }
                }
                KeyCode::Enter => {
                    let order = OrderSummary {
                        total: store.cart_total(),
                        item_count: store.cart_len(),
                    };
                    match Checkout::submit(&ui.payment, order) {
                        Ok(checkout) => {
                            info!("processing {} payment of ${:.2}", checkout.method.label(), order.total);
                            ui.checkout = Some(checkout);
                        }
                        Err(e) => ui.notify(e.to_string()),
                    }
                }
                KeyCode::Esc => ui.view = View::Cart,
                _ => {}
            }
        }
        View::Reading => match code {
            KeyCode::Right => {
                if let Some(session) = store.reading_mut() {
                    session.next_page();
                }
            }
            KeyCode::Left => {
                if let Some(session) = store.reading_mut() {
                    session.prev_page();
                }
            }
            KeyCode::Home => {
                if let Some(session) = store.reading_mut() {
                    session.restart();
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                store.close_reading();
                ui.view = View::Catalog;
            }
            _ => {}
        },
        View::Leaderboard => {
            if matches!(code, KeyCode::Esc | KeyCode::Char('q')) {
                ui.view = View::Catalog;
            }
        }
        View::Auth => {
            let form = &mut ui.auth;
            match code {
                KeyCode::Tab => {
                    form.mode = match form.mode {
                        AuthMode::Login => AuthMode::Signup,
                        AuthMode::Signup => AuthMode::Login,
                    };
                    form.field = 0;
                }
                KeyCode::Up => form.field = form.field.saturating_sub(1),
                KeyCode::Down => {
                    if form.field + 1 < form.field_count() {
                        form.field += 1;
                    }
                }
                KeyCode::Char(c) => form.focused_mut().push(c),
                KeyCode::Backspace => {
                    form.focused_mut().pop();
                }
                KeyCode::Enter => {
                    let result = match form.mode {
                        AuthMode::Login => store.login(&form.email, &form.password).map(|u| u.name.clone()),
                        AuthMode::Signup => store
                            .signup(&form.name, &form.email, &form.password)
                            .map(|u| u.name.clone()),
                    };
                    match result {
                        Ok(name) => {
                            ui.view = View::Catalog;
                            ui.notify(format!("Welcome, {}!", name));
                        }
                        Err(e) => ui.notify(e.to_string()),
                    }
                }
                KeyCode::Esc => ui.view = View::Catalog,
                _ => {}
            }
        }
    }
    false
}

fn add_to_cart<S: KeyValueStore>(store: &mut LibraryStore<S>, ui: &mut Ui, book: &Book) {
    if !store.is_logged_in() {
        ui.notify("Please login to add books to cart");
    } else if store.in_cart(&book.id) {
        ui.notify("Already in cart");
    } else {
        store.add_to_cart(book);
        ui.notify(format!("Added \"{}\" to cart", book.title));
    }
}

fn start_reading<S: KeyValueStore>(store: &mut LibraryStore<S>, ui: &mut Ui, book: &Book) {
    if !store.is_logged_in() {
        ui.notify("Please login to read books online");
        return;
    }
    store.start_reading(book);
    ui.view = View::Reading;
}

/// Advances the timers by `dt`. Reading only accrues while its view is open.
fn on_tick<S: KeyValueStore>(store: &mut LibraryStore<S>, ui: &mut Ui, dt: Duration) {
    if ui.view == View::Reading {
        store.tick_reading();
    }
    let finished = ui.checkout.as_mut().is_some_and(|c| c.advance(dt));
    if finished {
        store.clear_cart();
        ui.checkout = None;
        ui.view = View::Catalog;
        ui.notify("Order placed. Thank you!");
        info!("checkout completed");
    }
}

pub fn run_ui<S: KeyValueStore>(store: &mut LibraryStore<S>) -> anyhow::Result<()> {
    let mut stdout = stdout();
    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    stdout
        .execute(EnterAlternateScreen)
        .context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, store);

    terminal::disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    store: &mut LibraryStore<S>,
) -> anyhow::Result<()> {
    let mut ui = Ui::new();
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| draw_main_ui(f, store, &ui))?;

        let timeout = TICK.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                if kind == KeyEventKind::Press && handle_key(store, &mut ui, code) {
                    break;
                }
            }
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= TICK {
            last_tick = Instant::now();
            on_tick(store, &mut ui, elapsed);
        }
    }

    store.close_reading();
    Ok(())
}
