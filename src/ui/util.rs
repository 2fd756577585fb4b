use rust_decimal::{Decimal, RoundingStrategy};

/// Dollar display used by every view and export: `$1,234.50`. Overspent
/// remainders come out as `-$12.00`.
pub(crate) fn format_amount(amount: Decimal) -> String {
    let cents = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", cents.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if cents < Decimal::ZERO { "-" } else { "" };
    format!("{sign}${grouped}.{fraction}")
}

/// `$120.00 / $500.00`, spent against budget.
pub(crate) fn spent_of(spent: Decimal, budget: Decimal) -> String {
    format!("{} / {}", format_amount(spent), format_amount(budget))
}

/// Clip `text` to `width` characters, marking the cut with `…`.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().nth(width).is_none() {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let cut = text
        .char_indices()
        .nth(width - 1)
        .map_or(text.len(), |(at, _)| at);
    format!("{}…", &text[..cut])
}

/// Selected row plus the first row drawn, for one scrollable list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ListCursor {
    pub(crate) selected: usize,
    offset: usize,
}

impl ListCursor {
    pub(crate) fn next(&mut self, len: usize, page: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
            self.offset = self.start(page);
        }
    }

    pub(crate) fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.offset = self.offset.min(self.selected);
    }

    pub(crate) fn first(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn last(&mut self, len: usize, page: usize) {
        self.selected = len.saturating_sub(1);
        self.offset = self.start(page);
    }

    /// Pull the selection back inside a list that may have shrunk.
    pub(crate) fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
        self.offset = self.offset.min(self.selected);
    }

    /// First row to draw in a window of `page` rows so the selection shows.
    pub(crate) fn start(&self, page: usize) -> usize {
        let page = page.max(1);
        if self.selected < self.offset {
            self.selected
        } else if self.selected >= self.offset + page {
            self.selected + 1 - page
        } else {
            self.offset
        }
    }
}
