//! Section identities and document geometry.
//!
//! The page does not measure anything itself: hosts pass a [`PageLayout`]
//! (usually from their own layout pass) and the shell tracks scroll regions
//! and reveal targets against it. [`PageLayout::standard`] produces the
//! stacked single-column arrangement used by the demo and the tests.

use std::fmt;

use vitrine_core::{Rect, Size};

/// Top-level sections, in document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionId {
    Home,
    About,
    Projects,
    Skills,
    Contact,
}

impl SectionId {
    pub const ALL: [SectionId; 5] = [
        SectionId::Home,
        SectionId::About,
        SectionId::Projects,
        SectionId::Skills,
        SectionId::Contact,
    ];

    /// Stable in-page anchor (`#about` without the hash).
    pub fn anchor(self) -> &'static str {
        match self {
            SectionId::Home => "home",
            SectionId::About => "about",
            SectionId::Projects => "projects",
            SectionId::Skills => "skills",
            SectionId::Contact => "contact",
        }
    }

    /// Accepts the anchor with or without a leading `#`.
    pub fn from_anchor(anchor: &str) -> Option<Self> {
        let anchor = anchor.strip_prefix('#').unwrap_or(anchor);
        Self::ALL.into_iter().find(|id| id.anchor() == anchor)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.anchor())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionLayout {
    pub id: SectionId,
    pub bounds: Rect,
    /// Section title block; the hero uses its whole content container.
    pub heading: Rect,
    /// Revealable children in reveal order.
    pub items: Vec<Rect>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FooterLayout {
    pub bounds: Rect,
    pub items: Vec<Rect>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageLayout {
    pub viewport: Size,
    pub sections: Vec<SectionLayout>,
    pub footer: FooterLayout,
}

const NAV_HEIGHT: f32 = 64.0;
const SECTION_PADDING: f32 = 80.0;
const HEADING_HEIGHT: f32 = 140.0;
const GAP: f32 = 32.0;
const MAX_CONTENT_WIDTH: f32 = 1280.0;
const GUTTER: f32 = 16.0;

pub const TIMELINE_ENTRIES: usize = 5;
pub const PROJECT_CARDS: usize = 6;
pub const SKILL_CATEGORIES: usize = 4;
pub const SKILLS_PER_CATEGORY: usize = 4;
pub const CONTACT_FIELDS: usize = 5;
pub const FOOTER_LINKS: usize = 4;
const HERO_BLOCKS: [f32; 4] = [96.0, 48.0, 72.0, 56.0];

/// Vertical cursor over the centered content column.
struct Column {
    x: f32,
    width: f32,
    y: f32,
}

impl Column {
    fn new(viewport: Size, top: f32) -> Self {
        let width = (viewport.width - 2.0 * GUTTER).clamp(0.0, MAX_CONTENT_WIDTH);
        Self {
            x: (viewport.width - width) / 2.0,
            width,
            y: top,
        }
    }

    fn push(&mut self, height: f32, gap: f32) -> Rect {
        let r = Rect::new(self.x, self.y, self.width, height);
        self.y += height + gap;
        r
    }

    /// Lays out `count` equal cells in rows of `columns`.
    fn grid(&mut self, count: usize, columns: usize, height: f32) -> Vec<Rect> {
        let columns = columns.max(1);
        let cell_w = (self.width - GAP * (columns - 1) as f32) / columns as f32;
        let mut cells = Vec::with_capacity(count);
        for i in 0..count {
            let (row, col) = (i / columns, i % columns);
            cells.push(Rect::new(
                self.x + col as f32 * (cell_w + GAP),
                self.y + row as f32 * (height + GAP),
                cell_w,
                height,
            ));
        }
        let rows = count.div_ceil(columns);
        self.y += rows as f32 * (height + GAP);
        cells
    }
}

fn columns_for(width: f32, wide: usize) -> usize {
    if width >= 1024.0 {
        wide
    } else if width >= 768.0 {
        wide.min(2)
    } else {
        1
    }
}

impl PageLayout {
    /// Stacked sections sized for `viewport`; the hero fills the first screen.
    pub fn standard(viewport: Size) -> Self {
        let mut sections = Vec::with_capacity(SectionId::ALL.len());

        let hero_h = viewport.height.max(600.0);
        let blocks_h: f32 = HERO_BLOCKS.iter().sum::<f32>() + GAP * (HERO_BLOCKS.len() - 1) as f32;
        let mut col = Column::new(viewport, NAV_HEIGHT + ((hero_h - NAV_HEIGHT - blocks_h) / 2.0).max(0.0));
        let container_top = col.y;
        let items: Vec<Rect> = HERO_BLOCKS.iter().map(|h| col.push(*h, GAP)).collect();
        let heading = Rect::new(col.x, container_top, col.width, blocks_h);
        sections.push(SectionLayout {
            id: SectionId::Home,
            bounds: Rect::new(0.0, 0.0, viewport.width, hero_h),
            heading,
            items,
        });

        let mut top = hero_h;
        for id in [SectionId::About, SectionId::Projects, SectionId::Skills, SectionId::Contact] {
            let mut col = Column::new(viewport, top + SECTION_PADDING);
            let heading = col.push(HEADING_HEIGHT, GAP * 2.0);
            let items = match id {
                SectionId::About => (0..TIMELINE_ENTRIES).map(|_| col.push(160.0, GAP)).collect(),
                SectionId::Projects => col.grid(PROJECT_CARDS, columns_for(viewport.width, 3), 420.0),
                SectionId::Skills => {
                    let per_row = columns_for(viewport.width, 2);
                    let panels = col.grid(SKILL_CATEGORIES, per_row, 48.0 + 56.0 * SKILLS_PER_CATEGORY as f32);
                    panels
                        .iter()
                        .flat_map(|p| {
                            (0..SKILLS_PER_CATEGORY)
                                .map(move |i| Rect::new(p.x, p.y + 48.0 + 56.0 * i as f32, p.w, 44.0))
                        })
                        .collect()
                }
                SectionId::Contact => {
                    let heights: [f32; CONTACT_FIELDS] = [56.0, 56.0, 56.0, 160.0, 56.0];
                    heights.iter().map(|h| col.push(*h, 24.0)).collect()
                }
                SectionId::Home => Vec::new(),
            };
            let bottom = col.y - GAP + SECTION_PADDING;
            sections.push(SectionLayout {
                id,
                bounds: Rect::new(0.0, top, viewport.width, bottom - top),
                heading,
                items,
            });
            top = bottom;
        }

        let footer_bounds = Rect::new(0.0, top, viewport.width, 140.0);
        let link_w = 40.0;
        let row_w = FOOTER_LINKS as f32 * link_w + (FOOTER_LINKS - 1) as f32 * 16.0;
        let x0 = (viewport.width - row_w) / 2.0;
        let footer_items = (0..FOOTER_LINKS)
            .map(|i| Rect::new(x0 + i as f32 * (link_w + 16.0), top + 72.0, link_w, link_w))
            .collect();

        Self {
            viewport,
            sections,
            footer: FooterLayout {
                bounds: footer_bounds,
                items: footer_items,
            },
        }
    }

    /// Total document height (bottom of the footer).
    pub fn content_height(&self) -> f32 {
        self.footer.bounds.bottom()
    }

    pub fn section(&self, id: SectionId) -> Option<&SectionLayout> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Scroll offset that puts the top of `id` under the fixed nav bar.
    pub fn anchor_offset(&self, id: SectionId) -> Option<f32> {
        self.section(id).map(|s| s.bounds.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_round_trip() {
        for id in SectionId::ALL {
            assert_eq!(SectionId::from_anchor(id.anchor()), Some(id));
        }
        assert_eq!(SectionId::from_anchor("#skills"), Some(SectionId::Skills));
        assert_eq!(SectionId::from_anchor("blog"), None);
    }

    #[test]
    fn standard_layout_stacks_sections() {
        let layout = PageLayout::standard(Size::new(1280.0, 800.0));
        assert_eq!(layout.sections.len(), 5);
        assert_eq!(layout.sections[0].bounds.y, 0.0);
        assert_eq!(layout.sections[0].bounds.h, 800.0);
        for pair in layout.sections.windows(2) {
            assert_eq!(pair[0].bounds.bottom(), pair[1].bounds.y);
        }
        let last = &layout.sections[4];
        assert_eq!(layout.footer.bounds.y, last.bounds.bottom());
        assert_eq!(layout.content_height(), layout.footer.bounds.bottom());

        let skills = layout.section(SectionId::Skills).map(|s| s.items.len());
        assert_eq!(skills, Some(SKILL_CATEGORIES * SKILLS_PER_CATEGORY));
        let projects = layout.section(SectionId::Projects).map(|s| s.items.len());
        assert_eq!(projects, Some(PROJECT_CARDS));
    }

    #[test]
    fn narrow_viewport_uses_single_column() {
        let layout = PageLayout::standard(Size::new(375.0, 700.0));
        let Some(projects) = layout.section(SectionId::Projects) else {
            panic!("projects section missing");
        };
        assert!(projects.items.windows(2).all(|w| w[0].x == w[1].x));
        assert_eq!(layout.sections[0].bounds.h, 700.0);
    }
}
