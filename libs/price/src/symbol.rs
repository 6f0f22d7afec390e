use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Stock,
    Crypto,
}

/// What a tracker watches.
///
/// `ticker` is the short trading symbol shown to users. `id` is the identifier
/// the upstream API knows the asset by: the ticker itself for stocks, the
/// CoinGecko slug (e.g. `bitcoin`) for crypto.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    ticker: String,
    id: String,
    kind: SymbolKind,
}

impl Symbol {
    pub fn stock(ticker: impl Into<String>) -> Self {
        let ticker = normalize(ticker.into());
        Self {
            id: ticker.clone(),
            ticker,
            kind: SymbolKind::Stock,
        }
    }

    pub fn crypto(ticker: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            ticker: normalize(ticker.into()),
            id: slug.into().trim().to_lowercase(),
            kind: SymbolKind::Crypto,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Identifier interpolated into the upstream request path.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_crypto(&self) -> bool {
        self.kind == SymbolKind::Crypto
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SymbolKind::Stock => f.write_str(&self.ticker),
            SymbolKind::Crypto => write!(f, "{} ({})", self.ticker, self.id),
        }
    }
}

fn normalize(ticker: String) -> String {
    ticker.trim().to_uppercase()
}
