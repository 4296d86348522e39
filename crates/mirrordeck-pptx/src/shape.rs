//! Shape tree navigation.
//!
//! Slides, layouts and masters all hold their shapes under
//! `p:cSld/p:spTree`. Text lives in `p:sp` shapes; `p:grpSp` groups nest
//! further shapes whose offsets are in the group's own coordinate space.
//! Lookups match on local names so documents using unusual prefixes are
//! still understood.

use mirrordeck_ooxml::{qualify, XmlElement};

use crate::geometry::Position;

/// Where a shape sits in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeScope {
    /// Direct child of the slide's shape tree
    TopLevel,
    /// Inside a group shape
    Grouped,
}

/// `p:nvPr/p:ph` of a placeholder shape
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaceholderRef {
    /// Placeholder type (`title`, `body`, ...); absent means `obj`
    pub ph_type: Option<String>,
    /// Placeholder index used to match layout placeholders
    pub idx: Option<u32>,
}

/// State of a shape's `a:xfrm`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Xfrm {
    /// Offset and extent both present and numeric
    Explicit(Position),
    /// No `a:xfrm`; the position is inherited from the layout
    Absent,
    /// `a:xfrm` present but unusable
    Malformed(String),
}

/// The `p:spTree` of a slide, layout or master root element
pub fn shape_tree(root: &XmlElement) -> Option<&XmlElement> {
    root.child_local("cSld")?.child_local("spTree")
}

/// Mutable `p:spTree`
pub fn shape_tree_mut(root: &mut XmlElement) -> Option<&mut XmlElement> {
    root.child_local_mut("cSld")?.child_local_mut("spTree")
}

/// Visit every `p:sp` in document order, descending into groups
pub fn visit_shapes<'a>(tree: &'a XmlElement, f: &mut impl FnMut(&'a XmlElement, ShapeScope)) {
    visit(tree, ShapeScope::TopLevel, f);
}

fn visit<'a>(
    tree: &'a XmlElement,
    scope: ShapeScope,
    f: &mut impl FnMut(&'a XmlElement, ShapeScope),
) {
    for child in tree.elements() {
        match child.local_name() {
            "sp" => f(child, scope),
            "grpSp" => visit(child, ShapeScope::Grouped, f),
            _ => {}
        }
    }
}

/// Mutable variant of [`visit_shapes`]
pub fn visit_shapes_mut(tree: &mut XmlElement, f: &mut impl FnMut(&mut XmlElement, ShapeScope)) {
    visit_mut(tree, ShapeScope::TopLevel, f);
}

fn visit_mut(
    tree: &mut XmlElement,
    scope: ShapeScope,
    f: &mut impl FnMut(&mut XmlElement, ShapeScope),
) {
    for child in tree.elements_mut() {
        let local = child.local_name();
        let (is_shape, is_group) = (local == "sp", local == "grpSp");
        if is_shape {
            f(child, scope);
        } else if is_group {
            visit_mut(child, ShapeScope::Grouped, f);
        }
    }
}

/// The `index`-th `p:sp` in [`visit_shapes`] order.
///
/// Shape ids are not unique in real decks, so elements keep this
/// position as their lookup key.
pub fn nth_shape(tree: &XmlElement, index: usize) -> Option<&XmlElement> {
    let mut seen = 0;
    let mut found = None;
    visit_shapes(tree, &mut |shape, _| {
        if seen == index {
            found = Some(shape);
        }
        seen += 1;
    });
    found
}

/// Mutable variant of [`nth_shape`]
pub fn nth_shape_mut(tree: &mut XmlElement, index: usize) -> Option<&mut XmlElement> {
    nth_mut(tree, &mut 0, index)
}

fn nth_mut<'a>(
    tree: &'a mut XmlElement,
    seen: &mut usize,
    index: usize,
) -> Option<&'a mut XmlElement> {
    for child in tree.elements_mut() {
        let local = child.local_name();
        let (is_shape, is_group) = (local == "sp", local == "grpSp");
        if is_shape {
            if *seen == index {
                return Some(child);
            }
            *seen += 1;
        } else if is_group {
            if let Some(found) = nth_mut(child, seen, index) {
                return Some(found);
            }
        }
    }
    None
}

/// Find a `p:sp` by id without mutating
pub fn find_shape(tree: &XmlElement, id: u32) -> Option<&XmlElement> {
    let mut found = None;
    visit_shapes(tree, &mut |shape, _| {
        if found.is_none() && shape_id(shape) == Some(id) {
            found = Some(shape);
        }
    });
    found
}

fn non_visual(shape: &XmlElement) -> Option<&XmlElement> {
    shape.child_local("nvSpPr")
}

/// `p:cNvPr/@id`
pub fn shape_id(shape: &XmlElement) -> Option<u32> {
    non_visual(shape)?
        .child_local("cNvPr")?
        .attr("id")?
        .trim()
        .parse()
        .ok()
}

/// Human-readable label for diagnostics: `p:cNvPr/@name`, else the id
pub fn shape_label(shape: &XmlElement) -> String {
    let cnvpr = non_visual(shape).and_then(|nv| nv.child_local("cNvPr"));
    match cnvpr {
        Some(c) => match (c.attr("name"), c.attr("id")) {
            (Some(name), _) if !name.is_empty() => name.to_string(),
            (_, Some(id)) => format!("shape {}", id),
            _ => "unnamed shape".to_string(),
        },
        None => "unnamed shape".to_string(),
    }
}

/// Placeholder reference when the shape is a placeholder
pub fn placeholder(shape: &XmlElement) -> Option<PlaceholderRef> {
    let ph = non_visual(shape)?.child_local("nvPr")?.child_local("ph")?;
    Some(PlaceholderRef {
        ph_type: ph.attr("type").map(str::to_string),
        idx: ph.attr("idx").and_then(|i| i.trim().parse().ok()),
    })
}

/// `p:txBody`
pub fn text_body(shape: &XmlElement) -> Option<&XmlElement> {
    shape.child_local("txBody")
}

/// Mutable `p:txBody`
pub fn text_body_mut(shape: &mut XmlElement) -> Option<&mut XmlElement> {
    shape.child_local_mut("txBody")
}

/// Paragraphs (`a:p`) of a text body
pub fn paragraphs(body: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    body.children_local("p")
}

/// Plain text of a paragraph; `a:br` becomes a newline
pub fn paragraph_text(paragraph: &XmlElement) -> String {
    let mut text = String::new();
    for child in paragraph.elements() {
        match child.local_name() {
            "r" | "fld" => {
                for t in child.children_local("t") {
                    text.push_str(&t.text());
                }
            }
            "br" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Read the shape's `p:spPr/a:xfrm`
pub fn read_xfrm(shape: &XmlElement) -> Xfrm {
    let Some(xfrm) = shape
        .child_local("spPr")
        .and_then(|sp_pr| sp_pr.child_local("xfrm"))
    else {
        return Xfrm::Absent;
    };

    let (Some(off), Some(ext)) = (xfrm.child_local("off"), xfrm.child_local("ext")) else {
        return Xfrm::Malformed("a:xfrm lacks a:off or a:ext".to_string());
    };

    match (
        off.attr_i64("x"),
        off.attr_i64("y"),
        ext.attr_i64("cx"),
        ext.attr_i64("cy"),
    ) {
        (Some(x), Some(y), Some(cx), Some(cy)) if cx >= 0 && cy >= 0 => {
            Xfrm::Explicit(Position::new(x, y, cx, cy))
        }
        _ => Xfrm::Malformed("a:xfrm offset or extent is not a valid coordinate".to_string()),
    }
}

/// Overwrite the left offset of an explicit `a:xfrm`.
///
/// Returns false when the shape has no `a:xfrm/a:off`.
pub fn write_offset_x(shape: &mut XmlElement, offset_x: i64) -> bool {
    let off = shape
        .child_local_mut("spPr")
        .and_then(|sp_pr| sp_pr.child_local_mut("xfrm"))
        .and_then(|xfrm| xfrm.child_local_mut("off"));
    match off {
        Some(off) => {
            off.set_attr("x", offset_x.to_string());
            true
        }
        None => false,
    }
}

/// Give a shape an explicit `a:xfrm` at `position`.
///
/// `drawing_prefix` is the document's DrawingML prefix. `p:spPr` is
/// created after `p:nvSpPr` when missing and `a:xfrm` becomes its first
/// child.
pub fn insert_xfrm(shape: &mut XmlElement, drawing_prefix: &str, position: Position) {
    let sp_pr_name = qualify(shape.prefix(), "spPr");
    let sp_pr = shape.ensure_child(&sp_pr_name, |shape| {
        shape
            .position_of_any(&["nvSpPr"])
            .map(|i| i + 1)
            .unwrap_or(0)
    });

    let xfrm = XmlElement::new(qualify(drawing_prefix, "xfrm"))
        .with_child(
            XmlElement::new(qualify(drawing_prefix, "off"))
                .with_attr("x", position.offset_x.to_string())
                .with_attr("y", position.offset_y.to_string()),
        )
        .with_child(
            XmlElement::new(qualify(drawing_prefix, "ext"))
                .with_attr("cx", position.width.to_string())
                .with_attr("cy", position.height.to_string()),
        );
    sp_pr.insert_child(0, xfrm);
}
