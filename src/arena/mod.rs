//! Arena geometry: the implicit floor plus host layout elements that double
//! as platforms.
//!
//! Coordinates are container-local with y growing downward. Providers are
//! queried every tick and must be side-effect-free.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Floor,
    Element,
}

/// Walkable surface; only its top edge collides
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn floor(width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(0.0, height, width, FLOOR_THICKNESS),
            kind: PlatformKind::Floor,
        }
    }

    pub fn element(rect: Rect) -> Self {
        Self {
            rect,
            kind: PlatformKind::Element,
        }
    }

    pub fn top(&self) -> f32 {
        self.rect.y
    }
}

/// Source of platforms for one tick
pub trait ArenaProvider: Send + Sync {
    fn platforms(&self, container: Option<&Rect>) -> Vec<Platform>;

    /// Accept a fresh host layout; providers with fixed geometry ignore it
    fn update_layout(&mut self, _elements: Vec<HostElement>) {}
}

/// Size of the playfield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Container size, or `fallback` when absent or degenerate
    pub fn resolve(container: Option<&Rect>, fallback: Bounds) -> Self {
        match container {
            Some(c) if c.width > 0.0 && c.height > 0.0 && c.is_finite() => Self {
                width: c.width,
                height: c.height,
            },
            _ => fallback,
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: DEFAULT_ARENA_WIDTH,
            height: DEFAULT_ARENA_HEIGHT,
        }
    }
}

/// Host element reported by the page layout, in page coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostElement {
    pub selector: String,
    pub rect: Rect,
}

/// Platforms derived from the host page layout
#[derive(Debug, Clone, Default)]
pub struct LayoutArena {
    selectors: Vec<String>,
    elements: Vec<HostElement>,
    fallback: Bounds,
}

impl LayoutArena {
    pub fn new(selectors: Vec<String>) -> Self {
        Self {
            selectors,
            elements: Vec::new(),
            fallback: Bounds::default(),
        }
    }

    /// Arena size used when the container is absent
    pub fn with_fallback(mut self, fallback: Bounds) -> Self {
        self.fallback = fallback;
        self
    }

    /// Replace the current layout snapshot pushed by the host
    pub fn set_elements(&mut self, elements: Vec<HostElement>) {
        self.elements = elements;
    }

    pub fn elements(&self) -> &[HostElement] {
        &self.elements
    }

    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    fn is_designated(&self, element: &HostElement) -> bool {
        self.selectors.iter().any(|s| *s == element.selector)
    }
}

impl ArenaProvider for LayoutArena {
    fn update_layout(&mut self, elements: Vec<HostElement>) {
        self.set_elements(elements);
    }

    fn platforms(&self, container: Option<&Rect>) -> Vec<Platform> {
        let bounds = Bounds::resolve(container, self.fallback);
        let mut platforms = vec![Platform::floor(bounds.width, bounds.height)];

        let Some(container) = container else {
            return platforms;
        };

        let band_top = bounds.height * ARENA_BAND_TOP_FRACTION;
        let band_bottom = bounds.height * ARENA_BAND_BOTTOM_FRACTION;

        for element in self.elements.iter().filter(|e| self.is_designated(e)) {
            if !element.rect.is_finite() {
                continue;
            }
            let local = Rect::new(
                element.rect.x - container.x,
                element.rect.y - container.y,
                element.rect.width,
                element.rect.height,
            );
            if local.height < MIN_PLATFORM_HEIGHT || local.width <= 0.0 {
                continue;
            }
            if local.y < band_top || local.y > band_bottom {
                continue;
            }
            platforms.push(Platform::element(local));
        }

        platforms
    }
}

/// Fixed geometry, independent of the container
#[derive(Debug, Clone, Default)]
pub struct FixedArena {
    pub platforms: Vec<Platform>,
}

impl FixedArena {
    pub fn new(platforms: Vec<Platform>) -> Self {
        Self { platforms }
    }

    /// Just the floor of a `width` x `height` arena
    pub fn floor_only(width: f32, height: f32) -> Self {
        Self::new(vec![Platform::floor(width, height)])
    }
}

impl ArenaProvider for FixedArena {
    fn platforms(&self, _container: Option<&Rect>) -> Vec<Platform> {
        self.platforms.clone()
    }
}
