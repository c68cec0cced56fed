use std::io;

use crate::{
    error::{MazeError, Result},
    maze::{Cell, Maze},
};

/// Decode a maze from headerless CSV: one record per row, one integer code per cell.
pub fn read_maze<R: io::Read>(reader: R) -> Result<Maze> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        // Ragged rows are reported as malformed input by Maze::from_rows
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(rows.len() + 1);
        let row = record
            .iter()
            .map(|field| parse_code(field, line))
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }
    Maze::from_rows(rows)
}

fn parse_code(field: &str, line: usize) -> Result<Cell> {
    let code = field
        .parse::<u8>()
        .map_err(|_| MazeError::MalformedInput {
            line,
            reason: format!("{:?} is not a cell code", field),
        })?;
    Cell::from_code(code).ok_or_else(|| MazeError::MalformedInput {
        line,
        reason: format!("unknown cell code {}", code),
    })
}

/// Encode a maze as headerless CSV of integer codes.
pub fn write_maze<W: io::Write>(maze: &Maze, writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    for row in maze.row_slices() {
        writer.write_record(row.iter().map(|cell| cell.code().to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
