//! Display metadata for well-known tokens.

use serde::Serialize;

/// (mint address, symbol, name)
const KNOWN_TOKENS: &[(&str, &str, &str)] = &[
    ("So11111111111111111111111111111111111111112", "SOL", "Solana"),
    ("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", "BONK", "Bonk"),
    ("EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm", "WIF", "dogwifhat"),
    ("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU", "SAMO", "Samoyedcoin"),
    ("7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr", "POPCAT", "Popcat"),
    ("MEW1gQWJ3nEXg2qgERiKu7FAFj79PHvQVREQUzScPP5", "MEW", "Cat in a Dogs World"),
    ("5z3EqYQo9HiCEs3R84RCDMu2n7anpDMxRhdK8PSWmrRC", "PONKE", "Ponke"),
    ("HhJpBhRRn4g56VsyLuT8DL5Bv31HkXqsrahTTUCZeZg4", "MYRO", "Myro"),
    ("ukHH6c7mMyiWCf1b9pnWe25TSpkDDt3H5pQZgZ74J82", "BOME", "Book of Meme"),
    ("WENWENvqqNya429ubCdR81ZmD69brwQaaBYY6p3LCpk", "WEN", "Wen"),
    ("7BgBvyjrZX1YKz4oh9mjb8ZScatkkwb8DzFx7LoiVkM3", "SLERF", "Slerf"),
    ("5mbK36SZ7J19An8jFochhQS4of8g6BwUjbeCSxBSoWdp", "MICHI", "Michicoin"),
];

/// Symbol and name shown next to a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDisplay {
    pub symbol: String,
    pub name: String,
}

/// Look up display metadata, deriving a placeholder for unknown tokens.
#[must_use]
pub fn lookup(token_id: &str) -> TokenDisplay {
    KNOWN_TOKENS
        .iter()
        .find(|(mint, _, _)| *mint == token_id)
        .map_or_else(
            || placeholder(token_id),
            |(_, symbol, name)| TokenDisplay {
                symbol: (*symbol).to_string(),
                name: (*name).to_string(),
            },
        )
}

/// Symbol is the first 4 characters upper-cased; name is the first 8 plus `...`.
#[must_use]
pub fn placeholder(token_id: &str) -> TokenDisplay {
    let symbol: String = token_id.chars().take(4).collect();
    let name: String = token_id.chars().take(8).collect();
    TokenDisplay {
        symbol: symbol.to_uppercase(),
        name: format!("{name}..."),
    }
}
