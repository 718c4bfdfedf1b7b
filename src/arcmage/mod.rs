use crate::error::Result;
use crate::utils::http::Fetch;
use crate::utils::images::{ImageStore, Materialized, StoredImage};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

pub const DEFAULT_BASE: &str = "https://aminduna.arcmage.org";
pub const LICENSE_URL: &str = "https://arcmage.org/license/";

/// Deck export of "Set 1 - Rebirth", every card of the set once
pub const REBIRTH_DECK_GUID: &str = "2e852216-450b-4b2f-add3-e5126197e149";

pub fn deck_url(base: &str, deck_guid: &str) -> String {
    format!("{}/api/decks/{}", base, deck_guid)
}

pub fn card_url(base: &str, card_guid: &str) -> String {
    format!("{}/api/Cards/{}", base, card_guid)
}

// Raw API records. Every field is optional; accessors apply the defaults.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRecord {
    pub name: Option<Value>,
    pub deck_cards: Option<Vec<Option<DeckCardEntry>>>,
}

impl DeckRecord {
    /// Entries in deck order, null entries kept as empty ones
    pub fn entries(self) -> Vec<DeckCardEntry> {
        self.deck_cards
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckCardEntry {
    pub quantity: Option<Value>,
    pub card: Option<CardDetail>,
}

impl DeckCardEntry {
    /// Copies of the card in the deck; anything but a positive count means 1.
    pub fn quantity(&self) -> u64 {
        let parsed = match &self.quantity {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 1.0).map(|f| f as u64)),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed.filter(|q| *q > 0).unwrap_or(1)
    }

    pub fn card_guid(&self) -> Option<&str> {
        self.card.as_ref().and_then(|card| card.guid.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedRef {
    pub name: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetail {
    pub guid: Option<String>,
    pub name: Option<Value>,
    #[serde(rename = "type")]
    pub card_type: Option<NamedRef>,
    pub sub_type: Option<Value>,
    pub faction: Option<NamedRef>,
    pub cost: Option<Value>,
    pub loyalty: Option<Value>,
    pub attack: Option<Value>,
    pub defense: Option<Value>,
    pub rule_text: Option<Value>,
    pub artist: Option<Value>,
    pub artwork_licensor: Option<Value>,
    pub webp: Option<String>,
    pub jpeg: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// String content of a pass-through field, `None` for missing or non-string values
pub fn text(value: &Option<Value>) -> Option<&str> {
    value.as_ref().and_then(Value::as_str)
}

/// Values that count as "missing" when choosing a fallback
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

impl CardDetail {
    /// Type name, falling back to the subtype when the type object has none
    pub fn type_name(&self) -> Option<Value> {
        self.card_type
            .as_ref()
            .and_then(|t| t.name.clone())
            .filter(|name| !is_blank(name))
            .or_else(|| self.sub_type.clone())
    }

    pub fn faction_name(&self) -> Option<Value> {
        self.faction.as_ref().and_then(|f| f.name.clone())
    }

    /// Server path or URL of the artwork, WEBP preferred over JPEG
    pub fn image_reference(&self) -> Option<&str> {
        non_empty(&self.webp).or_else(|| non_empty(&self.jpeg))
    }
}

// Manifest written for the front-end

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputCard {
    pub guid: String,
    pub name: Option<Value>,
    #[serde(rename = "type")]
    pub card_type: Option<Value>,
    pub sub_type: Option<Value>,
    pub faction: Option<Value>,
    pub cost: Option<Value>,
    pub loyalty: Option<Value>,
    pub attack: Option<Value>,
    pub defense: Option<Value>,
    pub rule_text: Option<Value>,
    pub artist: Option<Value>,
    pub artwork_licensor: Option<Value>,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
}

impl OutputCard {
    pub fn from_detail(guid: String, detail: CardDetail, image: Option<String>) -> Self {
        Self {
            card_type: detail.type_name(),
            faction: detail.faction_name(),
            guid,
            name: detail.name,
            sub_type: detail.sub_type,
            cost: detail.cost,
            loyalty: detail.loyalty,
            attack: detail.attack,
            defense: detail.defense,
            rule_text: detail.rule_text,
            artist: detail.artist,
            artwork_licensor: detail.artwork_licensor,
            image,
            quantity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub deck_guid: String,
    pub deck_name: Option<Value>,
    pub base: String,
    pub license: String,
}

impl SourceInfo {
    pub fn new(deck_guid: &str, deck_name: Option<Value>, base: &str) -> Self {
        Self {
            deck_guid: deck_guid.to_string(),
            deck_name,
            base: base.to_string(),
            license: LICENSE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputManifest {
    pub source: SourceInfo,
    pub cards: Vec<OutputCard>,
}

/// What a fetcher run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub manifest: PathBuf,
    pub cards: usize,
    pub downloaded: usize,
    pub cached: usize,
    pub without_image: usize,
}

impl FetchReport {
    fn record(&mut self, image: Option<&StoredImage>) {
        match image.map(|stored| stored.outcome) {
            Some(Materialized::Downloaded) => self.downloaded += 1,
            Some(Materialized::Cached) => self.cached += 1,
            None => self.without_image += 1,
        }
    }

    pub fn print_summary(&self) {
        if self.cached > 0 {
            println!("Skipped {} images (already existed)", self.cached);
        }
        if self.downloaded > 0 {
            println!("Downloaded {} images", self.downloaded);
        }
        if self.without_image > 0 {
            println!("Cards without artwork: {}", self.without_image);
        }
    }
}

/// Make sure the card's artwork is on disk and return its public-relative path.
async fn card_image<F: Fetch>(
    fetcher: &F,
    base: &str,
    store: &ImageStore,
    guid: &str,
    detail: &CardDetail,
    report: &mut FetchReport,
) -> Result<Option<String>> {
    let stored = match detail.image_reference() {
        Some(reference) => Some(store.store(fetcher, base, guid, reference).await?),
        None => None,
    };
    report.record(stored.as_ref());
    Ok(stored.map(|image| image.relative))
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

pub mod deck;
pub mod rebirth;
