use price::PriceSnapshot;
use rust_decimal::Decimal;

/// Discord caps guild nicknames at 32 characters.
pub const MAX_NICKNAME_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleColor(pub u32);

impl RoleColor {
    pub const GREEN: RoleColor = RoleColor(0x00FF00);
    pub const RED: RoleColor = RoleColor(0xFF0000);
    pub const NEUTRAL: RoleColor = RoleColor(0x808080);
    pub const FLASH: RoleColor = RoleColor(0xFFFFFF);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn of(change: Decimal) -> Self {
        if change > Decimal::ZERO {
            Direction::Up
        } else if change < Decimal::ZERO {
            Direction::Down
        } else {
            Direction::Flat
        }
    }

    pub fn color(self) -> RoleColor {
        match self {
            Direction::Up => RoleColor::GREEN,
            Direction::Down => RoleColor::RED,
            Direction::Flat => RoleColor::NEUTRAL,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "⬈",
            Direction::Down => "⬊",
            Direction::Flat => "➡",
        }
    }

    /// True only for a sign flip between gaining and losing.
    pub fn flipped_from(self, previous: Direction) -> bool {
        matches!(
            (previous, self),
            (Direction::Up, Direction::Down) | (Direction::Down, Direction::Up)
        )
    }
}

/// Text pushed to the bot's presence for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub nickname: String,
    pub activity: String,
}

impl Label {
    /// When the nickname carries the price, the status only needs the move.
    pub fn render(name: &str, snapshot: &PriceSnapshot, price_in_nickname: bool) -> Self {
        let price = format_price(snapshot.current);
        let change = format_change(snapshot.change);

        let suffix = format!(" - ${price}");
        let budget = MAX_NICKNAME_LEN.saturating_sub(suffix.chars().count());
        let nickname = format!("{}{suffix}", truncate(name, budget).trim_end());
        let activity = if price_in_nickname {
            format!("{} {change}", Direction::of(snapshot.change).arrow())
        } else {
            format!("${price} / {change}")
        };

        Self { nickname, activity }
    }
}

pub fn format_price(price: Decimal) -> String {
    if price.abs() >= Decimal::ONE || price.is_zero() {
        format!("{:.2}", price.round_dp(2))
    } else {
        price.round_sf(6).unwrap_or(price).normalize().to_string()
    }
}

/// Moves under a cent keep three significant digits so the sign stays visible.
pub fn format_change(change: Decimal) -> String {
    let magnitude = change.abs();
    let digits = if magnitude >= CENT {
        format!("{:.2}", magnitude.round_dp(2))
    } else {
        magnitude.round_sf(3).unwrap_or(magnitude).normalize().to_string()
    };

    match Direction::of(change) {
        Direction::Up => format!("+{digits}"),
        Direction::Down => format!("-{digits}"),
        Direction::Flat => "0.00".to_string(),
    }
}

const CENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
