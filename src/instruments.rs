//! Instrument data for the demo: ticker → contract month → price rows.

use std::path::Path;
use std::rc::Rc;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tree::{IdentityProvider, TreeElement, TreeFilter, TreeVisibility};

/// Contract months generated under every ticker.
pub const CONTRACT_MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Row height hint carried by generated price rows.
pub const PRICE_ROW_HEIGHT: u16 = 1;

/// One row of instrument data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Stable key, e.g. `AMZN/MAR/2`; survives data refreshes.
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Instrument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            price: None,
        }
    }

    pub fn priced(id: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            price: Some(price),
        }
    }

    /// Text shown in the row; prices render with two decimals.
    pub fn label(&self) -> String {
        match self.price {
            Some(price) => format!("{price:.2}"),
            None => self.text.clone(),
        }
    }
}

/// Build a fresh instrument tree with random signed prices.
///
/// Every call allocates new elements, but ids repeat for the same ticker,
/// month and price slot.
pub fn generate<R: Rng>(
    tickers: &[String],
    prices_per_contract: usize,
    rng: &mut R,
) -> Vec<TreeElement<Instrument>> {
    tickers
        .iter()
        .map(|ticker| {
            let contracts = CONTRACT_MONTHS
                .iter()
                .map(|month| {
                    let contract_id = format!("{ticker}/{month}");
                    let prices = (0..prices_per_contract)
                        .map(|slot| {
                            TreeElement::new(Instrument::priced(
                                format!("{contract_id}/{slot}"),
                                random_price(rng),
                            ))
                            .height(PRICE_ROW_HEIGHT)
                        })
                        .collect();
                    TreeElement::new(Instrument::new(contract_id, *month)).with_children(prices)
                })
                .collect();
            TreeElement::new(Instrument::new(ticker.as_str(), ticker.as_str()))
                .with_children(contracts)
        })
        .collect()
}

/// Uniform magnitude in `[0, 100)`, random sign, rounded to cents.
fn random_price<R: Rng>(rng: &mut R) -> f64 {
    let magnitude: f64 = rng.gen_range(0.0..100.0);
    let signed = if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    };
    (signed * 100.0).round() / 100.0
}

/// Load a JSON array of tree elements.
pub fn load_json(path: &Path) -> Result<Vec<TreeElement<Instrument>>> {
    let content = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&content)?;
    Ok(data)
}

/// Move plain elements into the shared form the tree stores.
pub fn into_shared(elements: Vec<TreeElement<Instrument>>) -> Vec<TreeElement<Rc<Instrument>>> {
    elements
        .into_iter()
        .map(|element| element.map(&mut Rc::new))
        .collect()
}

/// Identity provider keyed on [`Instrument::id`].
pub fn identity() -> Box<dyn IdentityProvider<Instrument>> {
    Box::new(|instrument: &Instrument| instrument.id.clone())
}

/// How a search query is matched against row labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Matching rows reveal their whole subtree.
    pub tree_matches: bool,
    /// Fuzzy matching instead of case-insensitive substring search.
    pub fuzzy: bool,
}

/// Build the filter for a search query. An empty query means no filter.
///
/// Matching rows get `Tree` or `Visible`, everything else `Recurse`, so
/// ancestors of a match stay on screen.
pub fn search_filter(
    query: &str,
    options: SearchOptions,
) -> Option<Box<dyn TreeFilter<Instrument>>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    let hit = if options.tree_matches {
        TreeVisibility::Tree
    } else {
        TreeVisibility::Visible
    };

    let filter: Box<dyn TreeFilter<Instrument>> = if options.fuzzy {
        let matcher = SkimMatcherV2::default();
        Box::new(move |instrument: &Instrument| {
            match matcher.fuzzy_match(&instrument.label(), &query) {
                Some(_) => hit,
                None => TreeVisibility::Recurse,
            }
        })
    } else {
        Box::new(move |instrument: &Instrument| {
            if instrument.label().to_lowercase().contains(&query) {
                hit
            } else {
                TreeVisibility::Recurse
            }
        })
    };
    Some(filter)
}
