//! Single-page PDF raster of a maze: one filled square per cell.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use printpdf::{Color, Line, Mm, PdfDocument, PdfDocumentReference, Point, Pt};

use crate::{
    config::{Palette, Rgb},
    error::Result,
    maze::Maze,
};

/// A filled cell square, in points, with its lower-left corner at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub color: Rgb,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// Page geometry for a maze: the page size in points and one rectangle per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: f64,
    pub height: f64,
    pub rects: Vec<CellRect>,
}

/// Lay `maze` out on a page `cols * cell_size + 2 * margin` points wide and
/// `rows * cell_size + 2 * margin` points tall, with row 0 at the top.
pub fn layout_page(maze: &Maze, palette: &Palette, cell_size: f64, margin: f64) -> PageLayout {
    let (rows, cols) = maze.dimensions();
    let width = cols as f64 * cell_size + 2.0 * margin;
    let height = rows as f64 * cell_size + 2.0 * margin;

    let rects = maze
        .row_slices()
        .enumerate()
        .flat_map(|(row, cells)| {
            // PDF y grows upwards
            let y = height - (margin + (row + 1) as f64 * cell_size);
            cells.iter().enumerate().map(move |(col, &cell)| CellRect {
                color: palette.color(cell),
                x: margin + col as f64 * cell_size,
                y,
                size: cell_size,
            })
        })
        .collect();

    PageLayout {
        width,
        height,
        rects,
    }
}

fn fill_color(Rgb(r, g, b): Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        r as f64 / 255.0,
        g as f64 / 255.0,
        b as f64 / 255.0,
        None,
    ))
}

fn rectangle(rect: &CellRect) -> Line {
    let corner = |x: f64, y: f64| (Point::new(Mm::from(Pt(x)), Mm::from(Pt(y))), false);
    let (x0, y0) = (rect.x, rect.y);
    let (x1, y1) = (rect.x + rect.size, rect.y + rect.size);
    Line {
        points: vec![corner(x0, y0), corner(x1, y0), corner(x1, y1), corner(x0, y1)],
        is_closed: true,
        has_fill: true,
        has_stroke: false,
        is_clipping_path: false,
    }
}

fn build_document(layout: &PageLayout) -> PdfDocumentReference {
    let (doc, page, layer) = PdfDocument::new(
        "Maze",
        Mm::from(Pt(layout.width)),
        Mm::from(Pt(layout.height)),
        "Cells",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let mut current_color = None;
    for rect in &layout.rects {
        // Only switch fill colour between runs of differently coloured cells
        if current_color != Some(rect.color) {
            layer.set_fill_color(fill_color(rect.color));
            current_color = Some(rect.color);
        }
        layer.add_shape(rectangle(rect));
    }
    doc
}

/// Render `maze` as PDF into `writer`.
pub fn render_pdf<W: Write>(
    writer: W,
    maze: &Maze,
    palette: &Palette,
    cell_size: f64,
    margin: f64,
) -> Result<()> {
    let layout = layout_page(maze, palette, cell_size, margin);
    build_document(&layout).save(&mut BufWriter::new(writer))?;
    Ok(())
}

pub fn write_pdf(
    path: &Path,
    maze: &Maze,
    palette: &Palette,
    cell_size: f64,
    margin: f64,
) -> Result<()> {
    render_pdf(File::create(path)?, maze, palette, cell_size, margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::Cell;

    fn sample() -> Maze {
        Maze::from_rows(vec![
            vec![Cell::Start, Cell::Open, Cell::Wall],
            vec![Cell::Wall, Cell::FinalPath, Cell::Goal],
        ])
        .unwrap()
    }

    #[test]
    fn test_one_rectangle_per_cell() {
        let layout = layout_page(&sample(), &Palette::default(), 10.0, 5.0);
        assert_eq!((layout.width, layout.height), (40.0, 30.0));
        assert_eq!(layout.rects.len(), 6);
        assert!(layout.rects.iter().all(|rect| rect.size == 10.0));
    }

    #[test]
    fn test_row_zero_at_top() {
        let layout = layout_page(&sample(), &Palette::default(), 10.0, 5.0);
        let start = layout.rects[0];
        assert_eq!((start.x, start.y), (5.0, 15.0));
        let goal = layout.rects[5];
        assert_eq!((goal.x, goal.y), (25.0, 5.0));
    }

    #[test]
    fn test_palette_colors_used() {
        let palette = Palette::default();
        let layout = layout_page(&sample(), &palette, 10.0, 5.0);
        let colors = layout.rects.iter().map(|rect| rect.color).collect::<Vec<_>>();
        assert_eq!(
            colors,
            vec![
                palette.start,
                palette.open,
                palette.wall,
                palette.wall,
                palette.final_path,
                palette.goal,
            ]
        );
    }

    #[test]
    fn test_render_writes_pdf() {
        let mut buf = Vec::new();
        render_pdf(&mut buf, &sample(), &Palette::default(), 10.0, 5.0).unwrap();
        assert!(buf.starts_with(b"%PDF-"));
    }
}
