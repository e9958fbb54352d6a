//! Parser - Text ingestion of order records.
//!
//! One order per line: `<traderId> <B|S> <quantity> <price>`, whitespace
//! separated. Malformed lines never reach the engine.

use std::io::BufRead;
use std::str::FromStr;

use tracing::debug;

use crate::error::{ParseError, Result};
use crate::order::{Order, Side};

/// Line counts from one [`feed`] pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Lines read
    pub lines: u64,
    /// Lines handed to the callback as orders
    pub orders: u64,
    /// Lines skipped as malformed
    pub malformed: u64,
}

/// Parse one input record.
///
/// Zero values parse fine; the resulting order is simply not valid.
/// Tokens after the fourth are ignored.
pub fn parse_order(line: &str) -> std::result::Result<Order, ParseError> {
    let mut fields = line.split_whitespace();

    let trader_id = number(fields.next().ok_or(ParseError::Empty)?, "trader")?;
    let side = parse_side(fields.next().ok_or(ParseError::MissingField("side"))?)?;
    let quantity = number(fields.next().ok_or(ParseError::MissingField("quantity"))?, "quantity")?;
    let price = number(fields.next().ok_or(ParseError::MissingField("price"))?, "price")?;

    Ok(Order::new(trader_id, side, quantity, price))
}

fn number<T: FromStr>(token: &str, field: &'static str) -> std::result::Result<T, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: token.to_string(),
    })
}

/// Exactly one character, `B` or `S`.
fn parse_side(token: &str) -> std::result::Result<Side, ParseError> {
    let mut chars = token.chars();
    match (chars.next().and_then(Side::from_code), chars.next()) {
        (Some(side), None) => Ok(side),
        _ => Err(ParseError::UnknownSide(token.to_string())),
    }
}

/// Read records from `reader` and hand each parsed order to `on_order`,
/// in input order. Malformed lines are skipped.
///
/// Invalid-but-well-formed orders (e.g. trader id 0) are still handed over:
/// dropping them is the matching engine's job.
pub fn feed<R, F>(mut reader: R, mut on_order: F) -> Result<FeedStats>
where
    R: BufRead,
    F: FnMut(Order),
{
    let mut stats = FeedStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        stats.lines += 1;

        let parsed = std::str::from_utf8(&buf)
            .map_err(|_| ParseError::InvalidUtf8)
            .and_then(parse_order);
        match parsed {
            Ok(order) => {
                stats.orders += 1;
                on_order(order);
            }
            Err(err) => {
                stats.malformed += 1;
                debug!(
                    line_no = stats.lines,
                    line = %String::from_utf8_lossy(&buf).trim_end(),
                    error = %err,
                    "malformed order line skipped"
                );
            }
        }
    }

    Ok(stats)
}
