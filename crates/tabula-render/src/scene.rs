//! Display-list construction: a pure function of camera, elements, and
//! interaction state.

use crate::decode::ImageDecoder;
use crate::raster::{ContentRasterizer, RasterRequest};
use crate::renderer::RenderContext;
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape as _, Size, Vec2};
use log::warn;
use peniko::Color;
use tabula_core::camera::Camera;
use tabula_core::elements::{BitmapHandle, DashStyle, Element};
use tabula_core::handles::{handles_for, HandleKind, HANDLE_SIZE};
use tabula_core::host::theme_background;

/// World-space spacing of the dot grid at scale 1.
pub const GRID_BASE_SPACING: f64 = 40.0;
/// Below this on-screen spacing the grid is skipped entirely to avoid
/// aliasing and overdraw.
pub const MIN_GRID_SPACING_PX: f64 = 8.0;
const GRID_DOT_RADIUS_PX: f64 = 1.5;

/// Extra screen-pixel width of the selection glow under line/pen strokes.
const GLOW_EXTRA_PX: f64 = 6.0;
const PLACEHOLDER_STROKE_PX: f64 = 1.5;
const HANDLE_STROKE_PX: f64 = 1.5;
const MARQUEE_STROKE_PX: f64 = 1.0;
/// Font size used for document reference preview cards.
const PDF_CARD_FONT_SIZE: f64 = 14.0;

fn selection_color() -> Color {
    Color::from_rgba8(59, 130, 246, 255)
}

fn selection_glow() -> Color {
    Color::from_rgba8(59, 130, 246, 70)
}

fn marquee_fill() -> Color {
    Color::from_rgba8(59, 130, 246, 30)
}

fn grid_color(light_theme: bool) -> Color {
    if light_theme {
        Color::from_rgba8(214, 214, 214, 255)
    } else {
        Color::from_rgba8(52, 52, 56, 255)
    }
}

/// A single drawing command, in world coordinates. The backend applies the
/// scene transform when executing.
#[derive(Debug, Clone)]
pub enum DrawCmd {
    /// Clear the frame to a color.
    Clear(Color),
    FillPath {
        path: BezPath,
        color: Color,
    },
    StrokePath {
        path: BezPath,
        color: Color,
        /// Stroke width in world units.
        width: f64,
        /// Dash pattern in world units; empty means solid.
        dash: Vec<f64>,
    },
    /// Batched dot draw (the background grid).
    Dots {
        centers: Vec<Point>,
        radius: f64,
        color: Color,
    },
    /// Blit a cached bitmap into a world-space rectangle.
    Blit {
        bitmap: BitmapHandle,
        dest: Rect,
    },
}

/// A frame's display list plus the world-to-screen transform to execute it
/// under.
#[derive(Debug, Clone)]
pub struct Scene {
    pub transform: Affine,
    pub cmds: Vec<DrawCmd>,
}

/// Build the display list for one frame: background, grid, elements in store
/// order, selection affordances, marquee. Missing bitmaps are routed to the
/// rasterizer/decoder boundaries, guarded against duplicate requests.
pub fn build_scene(
    ctx: &RenderContext,
    rasterizer: &dyn ContentRasterizer,
    decoder: &dyn ImageDecoder,
) -> Scene {
    let camera = ctx.camera();
    let scale = camera.scale;
    let mut cmds = Vec::new();

    cmds.push(DrawCmd::Clear(theme_background(ctx.light_theme).into()));

    if ctx.grid_enabled {
        if let Some(dots) = grid_dots(camera, ctx.viewport, ctx.light_theme) {
            cmds.push(dots);
        }
    }

    for element in &ctx.board.elements {
        let selected = ctx.selection.contains(&element.id());
        match element {
            Element::Line(line) => {
                let mut path = BezPath::new();
                path.move_to(line.p1);
                path.line_to(line.p2);
                if selected {
                    cmds.push(glow_stroke(path.clone(), line.width, scale));
                }
                cmds.push(DrawCmd::StrokePath {
                    path,
                    color: line.color.into(),
                    width: line.width,
                    dash: dash_pattern(line.dash, line.width),
                });
                if line.arrow_start {
                    cmds.push(DrawCmd::FillPath {
                        path: arrowhead(line.p1, line.p2, line.width),
                        color: line.color.into(),
                    });
                }
                if line.arrow_end {
                    cmds.push(DrawCmd::FillPath {
                        path: arrowhead(line.p2, line.p1, line.width),
                        color: line.color.into(),
                    });
                }
            }
            Element::Pen(pen) => {
                let Some(first) = pen.points.first() else {
                    continue;
                };
                if pen.points.len() == 1 {
                    // A tap leaves a single dot.
                    cmds.push(DrawCmd::FillPath {
                        path: Circle::new(*first, pen.width / 2.0).to_path(0.1),
                        color: pen.color.into(),
                    });
                    continue;
                }
                let mut path = BezPath::new();
                path.move_to(*first);
                for point in pen.points.iter().skip(1) {
                    path.line_to(*point);
                }
                if selected {
                    cmds.push(glow_stroke(path.clone(), pen.width, scale));
                }
                cmds.push(DrawCmd::StrokePath {
                    path,
                    color: pen.color.into(),
                    width: pen.width,
                    dash: dash_pattern(pen.dash, pen.width),
                });
            }
            Element::Shape(shape) => {
                let path = shape.outline_path();
                if !shape.fill_color.is_transparent() {
                    cmds.push(DrawCmd::FillPath {
                        path: path.clone(),
                        color: shape.fill_color.into(),
                    });
                }
                if !shape.color.is_transparent() {
                    cmds.push(DrawCmd::StrokePath {
                        path,
                        color: shape.color.into(),
                        width: shape.stroke_width,
                        dash: dash_pattern(shape.dash, shape.stroke_width),
                    });
                }
            }
            Element::Text(text) => {
                if let Some(bitmap) = text.cache.bitmap() {
                    cmds.push(DrawCmd::Blit {
                        bitmap,
                        dest: text.bounds(),
                    });
                } else {
                    if text.cache.begin_render() {
                        let request = RasterRequest {
                            element: text.id,
                            markup: text.content.clone(),
                            width: text.width,
                            height: text.height,
                            font_size: text.font_size,
                            color: text.color,
                            light_theme: ctx.light_theme,
                        };
                        if let Err(err) = rasterizer.request(request) {
                            warn!("text rasterization request failed: {err}");
                            text.cache.fail();
                        }
                    }
                    cmds.push(placeholder_border(text.bounds(), text.color.into(), scale));
                }
            }
            Element::Image(image) => {
                if let Some(bitmap) = image.cache.bitmap() {
                    cmds.push(DrawCmd::Blit {
                        bitmap,
                        dest: image.bounds(),
                    });
                } else {
                    if image.cache.begin_render() {
                        if let Err(err) = decoder.request(image.id, &image.source) {
                            warn!("image decode request failed: {err}");
                            image.cache.fail();
                        }
                    }
                    cmds.push(placeholder_border(image.bounds(), image.color.into(), scale));
                }
            }
            Element::PdfRef(pdf) => {
                if let Some(bitmap) = pdf.cache.bitmap() {
                    cmds.push(DrawCmd::Blit {
                        bitmap,
                        dest: pdf.bounds(),
                    });
                } else {
                    if pdf.cache.begin_render() {
                        // The preview card, not the document: the external
                        // renderer lays out the display name.
                        let request = RasterRequest {
                            element: pdf.id,
                            markup: pdf.name.clone(),
                            width: pdf.width,
                            height: pdf.height,
                            font_size: PDF_CARD_FONT_SIZE,
                            color: pdf.color,
                            light_theme: ctx.light_theme,
                        };
                        if let Err(err) = rasterizer.request(request) {
                            warn!("preview card rasterization failed: {err}");
                            pdf.cache.fail();
                        }
                    }
                    cmds.push(placeholder_border(pdf.bounds(), pdf.color.into(), scale));
                }
            }
        }
    }

    for id in ctx.selection {
        if let Some(element) = ctx.board.get(*id) {
            push_handle_cmds(&mut cmds, element, scale);
        }
    }

    if let Some(rect) = ctx.gesture.marquee_rect() {
        cmds.push(DrawCmd::FillPath {
            path: rect.to_path(0.1),
            color: marquee_fill(),
        });
        cmds.push(DrawCmd::StrokePath {
            path: rect.to_path(0.1),
            color: selection_color(),
            width: MARQUEE_STROKE_PX / scale,
            dash: Vec::new(),
        });
    }

    Scene {
        transform: camera.transform(),
        cmds,
    }
}

/// Dot-grid batch, or `None` when the on-screen spacing would be too dense.
/// Dots live on the world-space lattice, so the pattern is phase-stable
/// under panning.
fn grid_dots(camera: &Camera, viewport: Size, light_theme: bool) -> Option<DrawCmd> {
    if GRID_BASE_SPACING * camera.scale < MIN_GRID_SPACING_PX {
        return None;
    }
    let view = camera.visible_world_rect(viewport);
    let x_start = (view.x0 / GRID_BASE_SPACING).floor() as i64;
    let x_end = (view.x1 / GRID_BASE_SPACING).ceil() as i64;
    let y_start = (view.y0 / GRID_BASE_SPACING).floor() as i64;
    let y_end = (view.y1 / GRID_BASE_SPACING).ceil() as i64;

    let mut centers = Vec::with_capacity(((x_end - x_start + 1) * (y_end - y_start + 1)) as usize);
    for i in x_start..=x_end {
        for j in y_start..=y_end {
            centers.push(Point::new(
                i as f64 * GRID_BASE_SPACING,
                j as f64 * GRID_BASE_SPACING,
            ));
        }
    }
    Some(DrawCmd::Dots {
        centers,
        radius: GRID_DOT_RADIUS_PX / camera.scale,
        color: grid_color(light_theme),
    })
}

fn dash_pattern(style: DashStyle, width: f64) -> Vec<f64> {
    let unit = width.max(1.0);
    match style {
        DashStyle::Solid => Vec::new(),
        DashStyle::Dashed => vec![unit * 4.0, unit * 3.0],
        DashStyle::Dotted => vec![unit, unit * 2.0],
    }
}

/// Filled triangle arrowhead at `tip`, oriented away from `from`.
fn arrowhead(tip: Point, from: Point, width: f64) -> BezPath {
    let dir = tip - from;
    let len = dir.hypot();
    let mut path = BezPath::new();
    if len < f64::EPSILON {
        return path;
    }
    let back = Vec2::new(-dir.x / len, -dir.y / len);
    let size = (width * 4.0).max(10.0);
    let spread = std::f64::consts::PI / 7.0;
    let rotate = |v: Vec2, angle: f64| {
        Vec2::new(
            v.x * angle.cos() - v.y * angle.sin(),
            v.x * angle.sin() + v.y * angle.cos(),
        )
    };
    path.move_to(tip);
    path.line_to(tip + rotate(back, spread) * size);
    path.line_to(tip + rotate(back, -spread) * size);
    path.close_path();
    path
}

fn glow_stroke(path: BezPath, width: f64, scale: f64) -> DrawCmd {
    DrawCmd::StrokePath {
        path,
        color: selection_glow(),
        width: width + GLOW_EXTRA_PX / scale,
        dash: Vec::new(),
    }
}

fn placeholder_border(bounds: Rect, color: Color, scale: f64) -> DrawCmd {
    DrawCmd::StrokePath {
        path: bounds.to_path(0.1),
        color,
        width: PLACEHOLDER_STROKE_PX / scale,
        dash: Vec::new(),
    }
}

/// Resize handles for one selected element: squares for box handles,
/// circles for line endpoints. Sizes are screen-constant.
fn push_handle_cmds(cmds: &mut Vec<DrawCmd>, element: &Element, scale: f64) {
    let size = HANDLE_SIZE / scale;
    for handle in handles_for(element) {
        let path = match handle.kind {
            HandleKind::Endpoint(_) => Circle::new(handle.position, size / 2.0).to_path(0.1),
            _ => Rect::from_center_size(handle.position, Size::new(size, size)).to_path(0.1),
        };
        cmds.push(DrawCmd::FillPath {
            path: path.clone(),
            color: Color::WHITE,
        });
        cmds.push(DrawCmd::StrokePath {
            path,
            color: selection_color(),
            width: HANDLE_STROKE_PX / scale,
            dash: Vec::new(),
        });
    }
}
