//! Page layout
//!
//! Lays the portfolio out as a [`LayoutTree`] for a viewport and scroll
//! offset. Boxes are viewport-relative: the scroll offset is subtracted from
//! every scrolling element, while the header and the scroll-to-top button
//! stay fixed.
//!
//! Text is not shaped; heights come from a fixed average glyph width, which
//! is enough for hit testing and for the desktop rendition.
//!
//! | Element | Key | Classes |
//! |---------|-----|---------|
//! | Section | `about`, `projects`, ... | `section` |
//! | Hero button | `hero/connect`, `hero/work` | `cursor-target` |
//! | Experience card | `experience/<id>` | `card cursor-target` |
//! | Project card | `project/<id>` | `card cursor-target spotlight-card` |
//! | Technology badge | `<card>/tech/<n>` | `badge cursor-target` |
//! | Skill category | `skill/<id>` | `card cursor-target` |
//! | Skill row | `skill/<id>/<n>` | `skill` |
//! | Skill level bar | `skill/<id>/<n>/level` | `skill-level` |
//! | Social link | `social/<n>` | `link cursor-target` |

use tracing::debug;

use crate::content::{Portfolio, Project};
use crate::geometry::{Rect, Viewport};
use crate::layout::{ElementId, ElementSpec, LayoutError, LayoutTree};
use crate::spotlight::SPOTLIGHT_CLASS;
use crate::target::DEFAULT_TARGET_CLASS;

/// Scroll offset after which the scroll-to-top button appears
pub const SCROLL_TO_TOP_THRESHOLD: f32 = 300.0;

/// Width below which grids collapse to one column
pub const BREAKPOINT_MD: f32 = 768.0;

/// Width below which the project grid has two columns
pub const BREAKPOINT_LG: f32 = 1024.0;

/// Key of the scroll-to-top button
pub const SCROLL_TO_TOP_KEY: &str = "scroll-to-top";

/// Key of the theme toggle in the header
pub const THEME_TOGGLE_KEY: &str = "theme-toggle";

/// Key of the contact form submit button
pub const CONTACT_SUBMIT_KEY: &str = "contact/submit";

const HEADER_HEIGHT: f32 = 64.0;
const CONTAINER_MAX: f32 = 1200.0;
const NARROW_MAX: f32 = 896.0;
const PAGE_PADDING: f32 = 16.0;
const SECTION_PADDING: f32 = 80.0;
const HERO_PADDING: f32 = 128.0;
const CARD_PADDING: f32 = 24.0;
const GAP: f32 = 24.0;
const CHAR_WIDTH: f32 = 8.5;
const LINE_HEIGHT: f32 = 24.0;

/// Height of one skill row: name line plus level bar
const SKILL_ROW_HEIGHT: f32 = 40.0;

/// Thickness of a skill level bar
pub const SKILL_BAR_HEIGHT: f32 = 8.0;

/// Gap between a skill level bar and the bottom of its row
pub const SKILL_BAR_MARGIN: f32 = 4.0;
const HEADING_HEIGHT: f32 = 48.0;
const BADGE_HEIGHT: f32 = 26.0;
const BADGE_GAP: f32 = 8.0;

const NAV_ITEMS: [(&str, &str); 5] = [
    ("About Me", "about"),
    ("Experience", "experience"),
    ("Skills", "skills"),
    ("Projects", "projects"),
    ("Contact", "contact"),
];

/// Number of project grid columns for a viewport width
pub fn project_columns(width: f32) -> usize {
    if width < BREAKPOINT_MD {
        1
    } else if width < BREAKPOINT_LG {
        2
    } else {
        3
    }
}

/// Result of one layout pass
#[derive(Debug, Clone)]
pub struct PageLayout {
    tree: LayoutTree,
    viewport: Viewport,
    scroll_y: f32,
    document_height: f32,
    anchors: Vec<(String, f32)>,
}

impl PageLayout {
    /// Lay out `portfolio` for `viewport` scrolled down by `scroll_y`
    pub fn build(portfolio: &Portfolio, viewport: Viewport, scroll_y: f32) -> Result<Self, LayoutError> {
        let scroll_y = scroll_y.max(0.0);
        let mut builder = Builder::new(viewport, scroll_y);

        builder.hero(portfolio)?;
        builder.about(portfolio)?;
        builder.experience(portfolio)?;
        builder.projects(portfolio)?;
        builder.skills(portfolio)?;
        builder.contact(portfolio)?;
        builder.footer(portfolio)?;
        // Fixed elements are appended last so they paint above scrolled content
        builder.header()?;
        if scroll_y > SCROLL_TO_TOP_THRESHOLD {
            builder.scroll_to_top()?;
        }

        debug!(
            "Page layout {}x{} @ {}: {} elements, {} px tall",
            viewport.width,
            viewport.height,
            scroll_y,
            builder.tree.len(),
            builder.y
        );

        Ok(Self {
            tree: builder.tree,
            viewport,
            scroll_y,
            document_height: builder.y,
            anchors: builder.anchors,
        })
    }

    /// The laid-out tree
    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    /// Take the tree
    pub fn into_tree(self) -> LayoutTree {
        self.tree
    }

    /// Viewport the page was laid out for
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Scroll offset the page was laid out at
    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Total page height
    pub fn document_height(&self) -> f32 {
        self.document_height
    }

    /// Largest useful scroll offset
    pub fn max_scroll(&self) -> f32 {
        (self.document_height - self.viewport.height).max(0.0)
    }

    /// Scroll offset that brings section `id` just under the header
    pub fn anchor(&self, id: &str) -> Option<f32> {
        self.anchors
            .iter()
            .find(|(anchor, _)| anchor == id)
            .map(|(_, top)| (top - HEADER_HEIGHT).clamp(0.0, self.max_scroll()))
    }
}

/// Lines needed for `text` at `width`
fn line_count(text: &str, width: f32) -> usize {
    let per_line = (width / CHAR_WIDTH).floor().max(1.0) as usize;
    text.lines()
        .map(|line| line.trim().chars().count().div_ceil(per_line).max(1))
        .sum::<usize>()
        .max(1)
}

fn text_height(text: &str, width: f32) -> f32 {
    line_count(text, width) as f32 * LINE_HEIGHT
}

fn text_width(text: &str) -> f32 {
    text.chars().count() as f32 * CHAR_WIDTH
}

struct Builder {
    tree: LayoutTree,
    viewport: Viewport,
    scroll_y: f32,
    /// Document y of the next section
    y: f32,
    anchors: Vec<(String, f32)>,
}

impl Builder {
    fn new(viewport: Viewport, scroll_y: f32) -> Self {
        Self {
            tree: LayoutTree::new(viewport.bounds()),
            viewport,
            scroll_y,
            y: HEADER_HEIGHT,
            anchors: Vec::new(),
        }
    }

    fn container(&self, max: f32) -> (f32, f32) {
        let width = (self.viewport.width - 2.0 * PAGE_PADDING).clamp(0.0, max);
        ((self.viewport.width - width) / 2.0, width)
    }

    /// Document rect to viewport rect
    fn scrolled(&self, left: f32, top: f32, width: f32, height: f32) -> Rect {
        Rect::new(left, top - self.scroll_y, width, height)
    }

    fn add(&mut self, parent: ElementId, spec: ElementSpec) -> Result<ElementId, LayoutError> {
        self.tree.append(parent, spec)
    }

    /// Append a section spanning the viewport; children are added by `fill`,
    /// which receives the section id and the content top and returns the
    /// content height
    fn section<F>(&mut self, key: &str, padding: f32, fill: F) -> Result<(), LayoutError>
    where
        F: FnOnce(&mut Self, ElementId, f32) -> Result<f32, LayoutError>,
    {
        let top = self.y;
        let root = self.tree.root();
        let placeholder = self.scrolled(0.0, top, self.viewport.width, 0.0);
        let id = self.add(root, ElementSpec::new(key, placeholder).class("section"))?;
        self.anchors.push((key.to_string(), top));

        let content = fill(self, id, top + padding)?;
        let height = content + 2.0 * padding;
        self.tree
            .set_bounds(id, self.scrolled(0.0, top, self.viewport.width, height));
        self.y = top + height;
        Ok(())
    }

    /// Section heading; returns its height including spacing
    fn heading(&mut self, parent: ElementId, key: &str, text: &str, top: f32) -> Result<f32, LayoutError> {
        let (left, width) = self.container(CONTAINER_MAX);
        let bounds = self.scrolled(left, top, width, HEADING_HEIGHT);
        self.add(parent, ElementSpec::new(format!("{}/heading", key), bounds).class("heading").label(text))?;
        Ok(HEADING_HEIGHT + 2.0 * GAP)
    }

    /// Wrap technology badges into rows; returns the rows' height
    fn badges(
        &mut self,
        parent: ElementId,
        owner: &str,
        labels: &[String],
        left: f32,
        top: f32,
        width: f32,
    ) -> Result<f32, LayoutError> {
        if labels.is_empty() {
            return Ok(0.0);
        }
        let mut x = left;
        let mut y = top;
        for (i, label) in labels.iter().enumerate() {
            let w = (text_width(label) * 0.85 + 20.0).min(width);
            if x > left && x + w > left + width {
                x = left;
                y += BADGE_HEIGHT + BADGE_GAP;
            }
            let bounds = self.scrolled(x, y, w, BADGE_HEIGHT);
            self.add(
                parent,
                ElementSpec::new(format!("{}/tech/{}", owner, i), bounds)
                    .class("badge")
                    .class(DEFAULT_TARGET_CLASS)
                    .label(label.as_str()),
            )?;
            x += w + BADGE_GAP;
        }
        Ok(y + BADGE_HEIGHT - top)
    }

    fn header(&mut self) -> Result<(), LayoutError> {
        let root = self.tree.root();
        let header = self.add(
            root,
            ElementSpec::new("header", Rect::new(0.0, 0.0, self.viewport.width, HEADER_HEIGHT)).class("header"),
        )?;

        let (left, width) = self.container(CONTAINER_MAX);
        self.add(
            header,
            ElementSpec::new("header/home", Rect::new(left, 16.0, width.min(240.0), 32.0))
                .class("brand")
                .label("MSD"),
        )?;

        let toggle_left = left + width - 40.0;
        self.add(
            header,
            ElementSpec::new(THEME_TOGGLE_KEY, Rect::new(toggle_left, 12.0, 40.0, 40.0))
                .class("button")
                .class(DEFAULT_TARGET_CLASS),
        )?;

        // Navigation collapses on narrow screens
        if self.viewport.width >= BREAKPOINT_MD {
            let mut x = toggle_left - GAP;
            for (label, anchor) in NAV_ITEMS.iter().rev() {
                let w = text_width(label) + 16.0;
                x -= w;
                self.add(
                    header,
                    ElementSpec::new(format!("nav/{}", anchor), Rect::new(x, 20.0, w, 24.0))
                        .class("nav-link")
                        .class(DEFAULT_TARGET_CLASS)
                        .label(*label),
                )?;
                x -= GAP;
            }
        }
        Ok(())
    }

    fn hero(&mut self, portfolio: &Portfolio) -> Result<(), LayoutError> {
        self.section("hero", HERO_PADDING, |b, id, top| {
            let (left, width) = b.container(CONTAINER_MAX);
            let mut y = top;

            let title = b.scrolled(left, y, width, 80.0);
            b.add(id, ElementSpec::new("hero/title", title).class("title").label("WHO AM I?"))?;
            y += 80.0 + 32.0;

            let tagline_h = text_height(&portfolio.personal.tagline, width);
            let tagline = b.scrolled(left, y, width, tagline_h);
            b.add(
                id,
                ElementSpec::new("hero/tagline", tagline)
                    .class("text")
                    .label(portfolio.personal.tagline.as_str()),
            )?;
            y += tagline_h + 48.0;

            let buttons = [("hero/connect", "Let's Connect"), ("hero/work", "View My Work")];
            let stacked = b.viewport.width < 640.0;
            let widths: Vec<f32> = buttons.iter().map(|(_, l)| text_width(l) + 64.0).collect();
            let row_width: f32 = widths.iter().sum::<f32>() + GAP;
            let mut x = left + (width - row_width).max(0.0) / 2.0;
            for ((key, label), w) in buttons.iter().zip(&widths) {
                let bx = if stacked { left + (width - w) / 2.0 } else { x };
                let bounds = b.scrolled(bx, y, *w, 60.0);
                b.add(
                    id,
                    ElementSpec::new(*key, bounds)
                        .class("button")
                        .class(DEFAULT_TARGET_CLASS)
                        .label(*label),
                )?;
                if stacked {
                    y += 60.0 + 16.0;
                } else {
                    x += w + GAP;
                }
            }
            if !stacked {
                y += 60.0;
            }
            Ok(y - top)
        })
    }

    fn about(&mut self, portfolio: &Portfolio) -> Result<(), LayoutError> {
        self.section("about", SECTION_PADDING, |b, id, top| {
            let mut y = top + b.heading(id, "about", "About Me", top)?;
            let (left, width) = b.container(NARROW_MAX);
            let bio_h = text_height(&portfolio.personal.bio, width);
            let bio = b.scrolled(left, y, width, bio_h);
            b.add(
                id,
                ElementSpec::new("about/bio", bio)
                    .class("text")
                    .label(portfolio.personal.bio.as_str()),
            )?;
            y += bio_h;
            Ok(y - top)
        })
    }

    fn experience(&mut self, portfolio: &Portfolio) -> Result<(), LayoutError> {
        self.section("experience", SECTION_PADDING, |b, id, top| {
            let mut y = top + b.heading(id, "experience", "Work Experience", top)?;
            let (left, width) = b.container(NARROW_MAX);
            let inner = (width - 2.0 * CARD_PADDING).max(0.0);

            for job in &portfolio.experience {
                let key = format!("experience/{}", job.id);
                let card = b.add(
                    id,
                    ElementSpec::new(key.as_str(), b.scrolled(left, y, width, 0.0))
                        .class("card")
                        .class(DEFAULT_TARGET_CLASS)
                        .label(format!("{} · {}", job.role, job.company)),
                )?;

                let mut cy = y + CARD_PADDING + 2.0 * LINE_HEIGHT;
                for line in &job.description {
                    cy += text_height(line, inner);
                }
                for line in &job.achievements {
                    cy += text_height(line, inner);
                }
                cy += 12.0;
                cy += b.badges(card, &key, &job.technologies, left + CARD_PADDING, cy, inner)?;

                let height = cy + CARD_PADDING - y;
                b.tree.set_bounds(card, b.scrolled(left, y, width, height));
                y += height + GAP;
            }
            Ok((y - GAP).max(top) - top)
        })
    }

    fn project_card(
        &mut self,
        parent: ElementId,
        project: &Project,
        left: f32,
        top: f32,
        width: f32,
    ) -> Result<(ElementId, f32), LayoutError> {
        let key = format!("project/{}", project.id);
        let card = self.add(
            parent,
            ElementSpec::new(key.as_str(), self.scrolled(left, top, width, 0.0))
                .class("card")
                .class(DEFAULT_TARGET_CLASS)
                .class(SPOTLIGHT_CLASS)
                .label(project.title.as_str()),
        )?;

        let inner = (width - 2.0 * CARD_PADDING).max(0.0);
        let mut y = top + CARD_PADDING;
        y += text_height(&project.title, inner) + 12.0;
        y += text_height(&project.description, inner) + 16.0;
        y += self.badges(card, &key, &project.technologies, left + CARD_PADDING, y, inner)?;
        y += 16.0;

        let code = self.scrolled(left + CARD_PADDING, y, 64.0, LINE_HEIGHT);
        self.add(
            card,
            ElementSpec::new(format!("{}/code", key), code)
                .class("link")
                .class(DEFAULT_TARGET_CLASS)
                .label("Code"),
        )?;
        if project.live_url.is_some() {
            let demo = self.scrolled(left + CARD_PADDING + 64.0 + GAP, y, 80.0, LINE_HEIGHT);
            self.add(
                card,
                ElementSpec::new(format!("{}/demo", key), demo)
                    .class("link")
                    .class(DEFAULT_TARGET_CLASS)
                    .label("Live Demo"),
            )?;
        }
        y += LINE_HEIGHT + CARD_PADDING;

        Ok((card, y - top))
    }

    fn projects(&mut self, portfolio: &Portfolio) -> Result<(), LayoutError> {
        self.section("projects", SECTION_PADDING, |b, id, top| {
            let mut y = top + b.heading(id, "projects", "Featured Projects", top)?;
            let (left, width) = b.container(CONTAINER_MAX);
            let columns = project_columns(b.viewport.width);
            let card_w = (width - GAP * (columns - 1) as f32) / columns as f32;

            let featured: Vec<&Project> = portfolio.featured_projects().collect();
            for row in featured.chunks(columns) {
                let mut cards = Vec::with_capacity(row.len());
                let mut row_h: f32 = 0.0;
                for (col, project) in row.iter().enumerate() {
                    let x = left + col as f32 * (card_w + GAP);
                    let (card, h) = b.project_card(id, project, x, y, card_w)?;
                    cards.push((card, x));
                    row_h = row_h.max(h);
                }
                // Cards in a row share the tallest height
                for (card, x) in cards {
                    b.tree.set_bounds(card, b.scrolled(x, y, card_w, row_h));
                }
                y += row_h + GAP;
            }
            Ok((y - GAP).max(top) - top)
        })
    }

    fn skills(&mut self, portfolio: &Portfolio) -> Result<(), LayoutError> {
        self.section("skills", SECTION_PADDING, |b, id, top| {
            let mut y = top + b.heading(id, "skills", "Skills & Expertise", top)?;
            let (left, width) = b.container(CONTAINER_MAX);
            let columns = project_columns(b.viewport.width);
            let card_w = (width - GAP * (columns - 1) as f32) / columns as f32;

            for row in portfolio.skills.chunks(columns) {
                let row_h = row
                    .iter()
                    .map(|c| 2.0 * CARD_PADDING + 2.0 * LINE_HEIGHT + c.skills.len() as f32 * SKILL_ROW_HEIGHT)
                    .fold(0.0, f32::max);
                for (col, category) in row.iter().enumerate() {
                    let x = left + col as f32 * (card_w + GAP);
                    let card = b.add(
                        id,
                        ElementSpec::new(format!("skill/{}", category.id), b.scrolled(x, y, card_w, row_h))
                            .class("card")
                            .class(DEFAULT_TARGET_CLASS)
                            .label(category.title.as_str()),
                    )?;

                    let track_w = card_w - 2.0 * CARD_PADDING;
                    let mut sy = y + CARD_PADDING + 2.0 * LINE_HEIGHT;
                    for (n, skill) in category.skills.iter().enumerate() {
                        let key = format!("skill/{}/{}", category.id, n);
                        let row_box = b.scrolled(x + CARD_PADDING, sy, track_w, SKILL_ROW_HEIGHT);
                        let skill_row = b.add(
                            card,
                            ElementSpec::new(key.as_str(), row_box)
                                .class("skill")
                                .label(skill.name.as_str()),
                        )?;
                        let filled = track_w * f32::from(skill.level.min(100)) / 100.0;
                        let bar_top = sy + SKILL_ROW_HEIGHT - SKILL_BAR_HEIGHT - SKILL_BAR_MARGIN;
                        let bar_box = b.scrolled(x + CARD_PADDING, bar_top, filled, SKILL_BAR_HEIGHT);
                        b.add(
                            skill_row,
                            ElementSpec::new(format!("{}/level", key), bar_box)
                                .class("skill-level")
                                .label(format!("{}%", skill.level)),
                        )?;
                        sy += SKILL_ROW_HEIGHT;
                    }
                }
                y += row_h + GAP;
            }
            Ok((y - GAP).max(top) - top)
        })
    }

    fn contact(&mut self, portfolio: &Portfolio) -> Result<(), LayoutError> {
        self.section("contact", SECTION_PADDING, |b, id, top| {
            let y = top + b.heading(id, "contact", "Get In Touch", top)?;
            let (left, width) = b.container(CONTAINER_MAX);
            let side_by_side = b.viewport.width >= BREAKPOINT_MD;
            let column_w = if side_by_side { (width - 48.0) / 2.0 } else { width };

            // Contact details and social links
            let mut info_y = y;
            let info = b.add(
                id,
                ElementSpec::new("contact/info", b.scrolled(left, y, column_w, 0.0))
                    .class("card")
                    .label(portfolio.contact.email.as_str()),
            )?;
            info_y += CARD_PADDING + 2.0 * LINE_HEIGHT + 16.0;
            for (i, link) in portfolio.contact.social_links.iter().enumerate() {
                let bounds = b.scrolled(left + CARD_PADDING, info_y, column_w - 2.0 * CARD_PADDING, 40.0);
                b.add(
                    info,
                    ElementSpec::new(format!("social/{}", i), bounds)
                        .class("link")
                        .class(DEFAULT_TARGET_CLASS)
                        .label(link.label.as_str()),
                )?;
                info_y += 48.0;
            }
            info_y += CARD_PADDING - 8.0;
            b.tree
                .set_bounds(info, b.scrolled(left, y, column_w, info_y - y));

            // Form
            let (form_left, form_top) = if side_by_side {
                (left + column_w + 48.0, y)
            } else {
                (left, info_y + GAP)
            };
            let form = b.add(
                id,
                ElementSpec::new("contact/form", b.scrolled(form_left, form_top, column_w, 0.0))
                    .class("card")
                    .label("Send a Message"),
            )?;
            let field_w = column_w - 2.0 * CARD_PADDING;
            let mut fy = form_top + CARD_PADDING + LINE_HEIGHT + 16.0;
            for (field, label, height) in [
                ("name", "Name", 40.0),
                ("email", "Email", 40.0),
                ("subject", "Subject", 40.0),
                ("message", "Message", 120.0),
            ] {
                let bounds = b.scrolled(form_left + CARD_PADDING, fy + LINE_HEIGHT, field_w, height);
                b.add(
                    form,
                    ElementSpec::new(format!("contact/{}", field), bounds)
                        .class("input")
                        .label(label),
                )?;
                fy += LINE_HEIGHT + height + 16.0;
            }
            let submit = b.scrolled(form_left + CARD_PADDING, fy, field_w, 44.0);
            b.add(
                form,
                ElementSpec::new(CONTACT_SUBMIT_KEY, submit)
                    .class("button")
                    .class(DEFAULT_TARGET_CLASS)
                    .label("Send Message"),
            )?;
            fy += 44.0 + CARD_PADDING;
            b.tree
                .set_bounds(form, b.scrolled(form_left, form_top, column_w, fy - form_top));

            let bottom = if side_by_side { info_y.max(fy) } else { fy };
            Ok(bottom - top)
        })
    }

    fn footer(&mut self, portfolio: &Portfolio) -> Result<(), LayoutError> {
        self.section("footer", 32.0, |b, id, top| {
            let (left, width) = b.container(CONTAINER_MAX);
            let bounds = b.scrolled(left, top, width, LINE_HEIGHT);
            b.add(
                id,
                ElementSpec::new("footer/credits", bounds)
                    .class("text")
                    .label(format!("© {}. All rights reserved.", portfolio.personal.name)),
            )?;
            Ok(LINE_HEIGHT)
        })
    }

    fn scroll_to_top(&mut self) -> Result<(), LayoutError> {
        let root = self.tree.root();
        let size = 48.0;
        let bounds = Rect::new(
            self.viewport.width - 32.0 - size,
            self.viewport.height - 32.0 - size,
            size,
            size,
        );
        self.add(
            root,
            ElementSpec::new(SCROLL_TO_TOP_KEY, bounds)
                .class("button")
                .class(DEFAULT_TARGET_CLASS)
                .label("Back to top"),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::layout::ElementKey;
    use crate::target::{TargetResolver, TargetSelector};

    fn portfolio() -> Portfolio {
        Portfolio::bundled().unwrap()
    }

    #[test]
    fn test_columns() {
        assert_eq!(project_columns(375.0), 1);
        assert_eq!(project_columns(767.9), 1);
        assert_eq!(project_columns(768.0), 2);
        assert_eq!(project_columns(1023.0), 2);
        assert_eq!(project_columns(1280.0), 3);
    }

    #[test]
    fn test_sections_in_order() {
        let page = PageLayout::build(&portfolio(), Viewport::new(1280.0, 800.0), 0.0).unwrap();
        let tree = page.tree();
        let tops: Vec<f32> = ["hero", "about", "experience", "projects", "skills", "contact", "footer"]
            .iter()
            .map(|key| tree.element_box(&ElementKey::from(*key)).unwrap().top)
            .collect();
        assert!(tops.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(tops[0], HEADER_HEIGHT);
        assert!(page.document_height() > 800.0);
    }

    #[test]
    fn test_project_grid_uses_breakpoints() {
        let content = portfolio();
        let wide = PageLayout::build(&content, Viewport::new(1280.0, 800.0), 0.0).unwrap();
        let narrow = PageLayout::build(&content, Viewport::new(375.0, 800.0), 0.0).unwrap();

        let first = ElementKey::from("project/promptfoo-contrib");
        let second = ElementKey::from("project/windows11-toolkit");

        let a = wide.tree().element_box(&first).unwrap();
        let b = wide.tree().element_box(&second).unwrap();
        assert_eq!(a.top, b.top);
        assert!(b.left > a.right());

        let a = narrow.tree().element_box(&first).unwrap();
        let b = narrow.tree().element_box(&second).unwrap();
        assert_eq!(a.left, b.left);
        assert!(b.top > a.bottom());
    }

    #[test]
    fn test_skill_bars_follow_levels() {
        let portfolio = Portfolio::bundled().unwrap();
        let page = PageLayout::build(&portfolio, Viewport::new(1280.0, 800.0), 0.0).unwrap();
        let tree = page.tree();

        let bars: Vec<_> = tree.elements_with_class("skill-level").collect();
        let skill_count: usize = portfolio.skills.iter().map(|c| c.skills.len()).sum();
        assert_eq!(bars.len(), skill_count);
        assert_eq!(tree.elements_with_class("skill").count(), skill_count);

        for category in &portfolio.skills {
            for (n, skill) in category.skills.iter().enumerate() {
                let key = format!("skill/{}/{}", category.id, n);
                let row = tree.get(tree.find(&ElementKey::from(key.as_str())).unwrap()).unwrap();
                assert_eq!(row.label(), Some(skill.name.as_str()));

                let bar_id = tree.find(&ElementKey::from(format!("{}/level", key).as_str())).unwrap();
                let bar = tree.get(bar_id).unwrap();
                assert_eq!(bar.parent(), Some(row.id()));
                let expected = row.bounds().width * f32::from(skill.level) / 100.0;
                assert!((bar.bounds().width - expected).abs() < 1e-3);
                assert_eq!(bar.label(), Some(format!("{}%", skill.level).as_str()));
            }
        }
    }

    #[test]
    fn test_only_featured_projects_are_spotlights() {
        let page = PageLayout::build(&portfolio(), Viewport::default(), 0.0).unwrap();
        let cards: Vec<_> = page.tree().elements_with_class(SPOTLIGHT_CLASS).collect();
        assert_eq!(cards.len(), 6);
        assert!(cards.iter().all(|c| c.key().as_str().starts_with("project/")));
    }

    #[test]
    fn test_scroll_moves_content_not_header() {
        let content = portfolio();
        let top = PageLayout::build(&content, Viewport::default(), 0.0).unwrap();
        let scrolled = PageLayout::build(&content, Viewport::default(), 250.0).unwrap();

        let about = ElementKey::from("about");
        assert_eq!(
            top.tree().element_box(&about).unwrap().top - 250.0,
            scrolled.tree().element_box(&about).unwrap().top
        );
        let header = ElementKey::from("header");
        assert_eq!(
            top.tree().element_box(&header),
            scrolled.tree().element_box(&header)
        );
    }

    #[test]
    fn test_scroll_to_top_threshold() {
        let content = portfolio();
        let key = ElementKey::from(SCROLL_TO_TOP_KEY);
        let at = PageLayout::build(&content, Viewport::default(), 300.0).unwrap();
        assert!(at.tree().find(&key).is_none());
        let past = PageLayout::build(&content, Viewport::default(), 301.0).unwrap();
        assert!(past.tree().find(&key).is_some());
    }

    #[test]
    fn test_badge_resolves_inside_card() {
        let page = PageLayout::build(&portfolio(), Viewport::default(), 0.0).unwrap();
        let tree = page.tree();
        let badge = tree
            .element_box(&ElementKey::from("experience/current/tech/0"))
            .unwrap();
        let card = tree.element_box(&ElementKey::from("experience/current")).unwrap();
        assert!(card.contains(badge.center()));

        let resolver = TargetResolver::new(TargetSelector::default());
        let on_badge = resolver.resolve(tree, badge.center()).unwrap();
        assert_eq!(on_badge.source_element.as_str(), "experience/current/tech/0");

        let on_card = resolver
            .resolve(tree, Point::new(card.left + 4.0, card.top + 4.0))
            .unwrap();
        assert_eq!(on_card.source_element.as_str(), "experience/current");
    }

    #[test]
    fn test_anchor_clamped() {
        let page = PageLayout::build(&portfolio(), Viewport::default(), 0.0).unwrap();
        assert_eq!(page.anchor("hero"), Some(0.0));
        let contact = page.anchor("contact").unwrap();
        assert!(contact > 0.0 && contact <= page.max_scroll());
        assert_eq!(page.anchor("nope"), None);
    }
}
