//! Block types.
//!
//! A [`Block`] is the atomic unit of document content: a typed text payload
//! with a stable id. Type-specific fields (`level`, `checked`, `linkType`,
//! `linkValue`) are optional and only meaningful for their own block type.
//!
//! The serialized form matches the persisted editor state:
//!
//! ```json
//! { "id": "…", "type": "header", "content": "Notes", "level": 2 }
//! { "id": "…", "type": "link", "content": "Plan", "linkType": "page", "linkValue": "Plan" }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Smallest header level.
pub const MIN_HEADER_LEVEL: u8 = 1;

/// Largest header level.
pub const MAX_HEADER_LEVEL: u8 = 3;

/// Opaque block identifier, unique within its document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The kind of content a block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    /// Plain text
    #[default]
    Paragraph,
    /// Heading with a level of 1-3
    Header,
    /// Bullet list item
    BulletList,
    /// Checkbox (to-do) item
    Checkbox,
    /// Preformatted, multi-line code
    Code,
    /// Link to another page or to a URL
    Link,
}

impl BlockType {
    /// The serialized name (`"bullet-list"`, `"code"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Header => "header",
            BlockType::BulletList => "bullet-list",
            BlockType::Checkbox => "checkbox",
            BlockType::Code => "code",
            BlockType::Link => "link",
        }
    }

    /// Parse a serialized name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "paragraph" => Some(BlockType::Paragraph),
            "header" => Some(BlockType::Header),
            "bullet-list" => Some(BlockType::BulletList),
            "checkbox" => Some(BlockType::Checkbox),
            "code" => Some(BlockType::Code),
            "link" => Some(BlockType::Link),
            _ => None,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target kind of a link block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Links to another document by title
    Page,
    /// Links to an external URL
    Url,
}

impl LinkType {
    /// The serialized name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Page => "page",
            LinkType::Url => "url",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a link block is in its selection flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    /// No link type chosen yet
    AwaitingType,
    /// Page link without a target title
    AwaitingTarget,
    /// URL link without a URL
    AwaitingUrl,
    /// `linkValue` is populated
    Resolved,
}

/// A typed unit of document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Unique id within the owning document
    pub id: BlockId,

    /// Block kind
    #[serde(rename = "type", default)]
    pub block_type: BlockType,

    /// Raw text payload (display text for links)
    #[serde(default)]
    pub content: String,

    /// Header level (1-3), headers only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub level: Option<u8>,

    /// Checked state, checkboxes only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub checked: Option<bool>,

    /// Link target kind, links only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub link_type: Option<LinkType>,

    /// Link target (page title or URL), links only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub link_value: Option<String>,
}

impl Block {
    /// Create a block of the given type with a fresh id.
    ///
    /// Headers start at level 1 and checkboxes unchecked.
    pub fn new(block_type: BlockType, content: impl Into<String>) -> Self {
        let mut block = Self {
            id: BlockId::generate(),
            block_type: BlockType::Paragraph,
            content: content.into(),
            level: None,
            checked: None,
            link_type: None,
            link_value: None,
        };
        block.set_type(block_type, None);
        block
    }

    /// A paragraph block.
    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::new(BlockType::Paragraph, content)
    }

    /// A header block; `level` is clamped to 1-3.
    pub fn header(level: u8, content: impl Into<String>) -> Self {
        let mut block = Self::new(BlockType::Header, content);
        block.level = Some(clamp_level(level));
        block
    }

    /// An unchecked checkbox block.
    pub fn checkbox(content: impl Into<String>) -> Self {
        Self::new(BlockType::Checkbox, content)
    }

    /// A link block awaiting its target.
    pub fn link(link_type: LinkType) -> Self {
        let mut block = Self::new(BlockType::Link, "");
        block.link_type = Some(link_type);
        block.link_value = Some(String::new());
        block
    }

    /// Replace the generated id.
    pub fn with_id(mut self, id: impl Into<BlockId>) -> Self {
        self.id = id.into();
        self
    }

    /// A new block that continues this one after a split: same type and
    /// level, unchecked if a checkbox, holding `content`.
    pub fn successor(&self, content: impl Into<String>) -> Self {
        let mut block = Self::new(self.block_type, content);
        if self.block_type == BlockType::Header {
            block.level = Some(self.header_level());
        }
        block
    }

    /// Change the block type, keeping only the fields meaningful for it.
    ///
    /// `level` applies to headers (defaulting to the current level, else 1).
    /// Checkboxes become unchecked; link fields are cleared.
    pub fn set_type(&mut self, block_type: BlockType, level: Option<u8>) {
        self.level = match block_type {
            BlockType::Header => Some(clamp_level(
                level.or(self.level).unwrap_or(MIN_HEADER_LEVEL),
            )),
            _ => None,
        };
        self.checked = (block_type == BlockType::Checkbox).then_some(false);
        self.link_type = None;
        self.link_value = None;
        self.block_type = block_type;
    }

    /// Header level, defaulting to 1 when unset.
    pub fn header_level(&self) -> u8 {
        self.level.map(clamp_level).unwrap_or(MIN_HEADER_LEVEL)
    }

    /// Whether the checkbox is checked (`false` for other types).
    pub fn is_checked(&self) -> bool {
        self.block_type == BlockType::Checkbox && self.checked.unwrap_or(false)
    }

    /// Whether the block has no text.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The link selection state, or `None` for non-link blocks.
    pub fn link_state(&self) -> Option<LinkState> {
        if self.block_type != BlockType::Link {
            return None;
        }
        let has_value = self.link_value.as_deref().is_some_and(|v| !v.is_empty());
        Some(match (self.link_type, has_value) {
            (None, _) => LinkState::AwaitingType,
            (Some(_), true) => LinkState::Resolved,
            (Some(LinkType::Page), false) => LinkState::AwaitingTarget,
            (Some(LinkType::Url), false) => LinkState::AwaitingUrl,
        })
    }

    /// Page title this block links to, if it is a resolved page link.
    pub fn page_target(&self) -> Option<&str> {
        match (self.block_type, self.link_type) {
            (BlockType::Link, Some(LinkType::Page)) => {
                self.link_value.as_deref().filter(|v| !v.is_empty())
            }
            _ => None,
        }
    }

    /// Text to show for a link block: its content, else its target.
    pub fn link_display_text(&self) -> &str {
        if !self.content.is_empty() {
            return &self.content;
        }
        match self.link_value.as_deref() {
            Some(value) if !value.is_empty() => value,
            _ if self.link_type == Some(LinkType::Page) => "Select a page...",
            _ => "Enter URL...",
        }
    }
}

/// Partial update for a block. Unset fields are left untouched.
///
/// Setting `block_type` normalizes the type-specific fields the same way
/// [`Block::set_type`] does, before the other fields of the patch apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    /// New block type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub block_type: Option<BlockType>,

    /// New content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub content: Option<String>,

    /// New header level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub level: Option<u8>,

    /// New checked state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub checked: Option<bool>,

    /// New link type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub link_type: Option<LinkType>,

    /// New link target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub link_value: Option<String>,
}

impl BlockPatch {
    /// A patch that only replaces content.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// A patch that only sets the checked state.
    pub fn checked(checked: bool) -> Self {
        Self {
            checked: Some(checked),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this patch into `block`.
    pub fn apply(&self, block: &mut Block) {
        if let Some(block_type) = self.block_type {
            block.set_type(block_type, self.level);
        }
        if let Some(content) = &self.content {
            block.content = content.clone();
        }
        if let Some(level) = self.level {
            block.level = Some(clamp_level(level));
        }
        if let Some(checked) = self.checked {
            block.checked = Some(checked);
        }
        if let Some(link_type) = self.link_type {
            block.link_type = Some(link_type);
        }
        if let Some(link_value) = &self.link_value {
            block.link_value = Some(link_value.clone());
        }
    }
}

fn clamp_level(level: u8) -> u8 {
    level.clamp(MIN_HEADER_LEVEL, MAX_HEADER_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: std::collections::HashSet<BlockId> =
            (0..1000).map(|_| BlockId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_new_sets_type_fields() {
        let header = Block::new(BlockType::Header, "Title");
        assert_eq!(header.level, Some(1));
        assert_eq!(header.checked, None);

        let checkbox = Block::checkbox("todo");
        assert_eq!(checkbox.checked, Some(false));
        assert_eq!(checkbox.level, None);
    }

    #[test]
    fn test_header_level_clamped() {
        assert_eq!(Block::header(7, "x").level, Some(3));
        assert_eq!(Block::header(0, "x").level, Some(1));
    }

    #[test]
    fn test_successor_copies_type_and_level() {
        let header = Block::header(2, "Intro");
        let next = header.successor("more");
        assert_ne!(next.id, header.id);
        assert_eq!(next.block_type, BlockType::Header);
        assert_eq!(next.level, Some(2));
        assert_eq!(next.content, "more");
    }

    #[test]
    fn test_successor_checkbox_unchecked() {
        let mut done = Block::checkbox("done");
        done.checked = Some(true);
        let next = done.successor("");
        assert_eq!(next.checked, Some(false));
    }

    #[test]
    fn test_set_type_clears_foreign_fields() {
        let mut block = Block::header(2, "x");
        block.set_type(BlockType::Checkbox, None);
        assert_eq!(block.level, None);
        assert_eq!(block.checked, Some(false));

        block.set_type(BlockType::Paragraph, None);
        assert_eq!(block.checked, None);
    }

    #[test]
    fn test_link_states() {
        let mut block = Block::paragraph("");
        assert_eq!(block.link_state(), None);

        block.set_type(BlockType::Link, None);
        assert_eq!(block.link_state(), Some(LinkState::AwaitingType));

        let mut page = Block::link(LinkType::Page);
        assert_eq!(page.link_state(), Some(LinkState::AwaitingTarget));
        assert_eq!(page.page_target(), None);
        page.link_value = Some("Plan".to_string());
        assert_eq!(page.link_state(), Some(LinkState::Resolved));
        assert_eq!(page.page_target(), Some("Plan"));

        assert_eq!(
            Block::link(LinkType::Url).link_state(),
            Some(LinkState::AwaitingUrl)
        );
    }

    #[test]
    fn test_link_display_text() {
        let mut url = Block::link(LinkType::Url);
        assert_eq!(url.link_display_text(), "Enter URL...");
        url.link_value = Some("https://example.com".to_string());
        assert_eq!(url.link_display_text(), "https://example.com");
        url.content = "Example".to_string();
        assert_eq!(url.link_display_text(), "Example");
    }

    #[test]
    fn test_patch_merges_only_set_fields() {
        let mut block = Block::checkbox("a");
        BlockPatch::checked(true).apply(&mut block);
        assert_eq!(block.content, "a");
        assert!(block.is_checked());

        BlockPatch::content("b").apply(&mut block);
        assert_eq!(block.content, "b");
        assert!(block.is_checked());
    }

    #[test]
    fn test_patch_type_change_normalizes() {
        let mut block = Block::checkbox("a");
        let patch = BlockPatch {
            block_type: Some(BlockType::Header),
            level: Some(3),
            ..BlockPatch::default()
        };
        patch.apply(&mut block);
        assert_eq!(block.block_type, BlockType::Header);
        assert_eq!(block.level, Some(3));
        assert_eq!(block.checked, None);
    }

    #[test]
    fn test_serialized_shape() {
        let block = Block::link(LinkType::Page).with_id("b1");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "b1",
                "type": "link",
                "content": "",
                "linkType": "page",
                "linkValue": ""
            })
        );

        let para = Block::paragraph("hi").with_id("b2");
        let json = serde_json::to_value(&para).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "b2", "type": "paragraph", "content": "hi" })
        );
    }

    #[test]
    fn test_deserialize_tolerates_missing_fields() {
        let block: Block = serde_json::from_str(r#"{"id":"block-1"}"#).unwrap();
        assert_eq!(block.block_type, BlockType::Paragraph);
        assert_eq!(block.content, "");

        let block: Block =
            serde_json::from_str(r#"{"id":"b","type":"bullet-list","content":"x"}"#).unwrap();
        assert_eq!(block.block_type, BlockType::BulletList);
    }

    #[test]
    fn test_block_type_names_round_trip() {
        for ty in [
            BlockType::Paragraph,
            BlockType::Header,
            BlockType::BulletList,
            BlockType::Checkbox,
            BlockType::Code,
            BlockType::Link,
        ] {
            assert_eq!(BlockType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(BlockType::parse("table"), None);
    }
}
