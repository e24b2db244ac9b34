use crate::error::{Error, Result};

/// One grid cell. The discriminants are the input-file symbols, so a row of
/// cells and its wire form share the same alphabet.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Tree = b'a',
    Lake = b'l',
    Desert = b'd',
}

impl Cell {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'a' => Some(Cell::Tree),
            'l' => Some(Cell::Lake),
            'd' => Some(Cell::Desert),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        self as u8 as char
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::from_symbol(byte as char)
    }

    pub fn byte(self) -> u8 {
        self as u8
    }
}

/// Encode a run of cells for the wire.
pub fn encode(cells: &[Cell]) -> Vec<u8> {
    cells.iter().map(|cell| cell.byte()).collect()
}

/// Decode a wire buffer back into cells. A byte outside the cell alphabet
/// means a peer sent garbage, which is a fatal protocol fault upstream.
pub fn decode(bytes: &[u8]) -> Result<Vec<Cell>> {
    bytes
        .iter()
        .enumerate()
        .map(|(index, &byte)| {
            Cell::from_byte(byte).ok_or(Error::Symbol {
                symbol: byte as char,
                index,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_round_trip() {
        for cell in [Cell::Tree, Cell::Lake, Cell::Desert] {
            assert_eq!(Cell::from_symbol(cell.symbol()), Some(cell));
            assert_eq!(Cell::from_byte(cell.byte()), Some(cell));
        }
    }

    #[test]
    fn test_unknown_symbol_rejected() {
        assert_eq!(Cell::from_symbol('x'), None);
        assert_eq!(Cell::from_symbol('0'), None);
        assert_eq!(Cell::from_byte(0), None);
    }

    #[test]
    fn test_wire_round_trip() {
        let cells = vec![Cell::Tree, Cell::Desert, Cell::Lake, Cell::Lake];
        assert_eq!(decode(&encode(&cells)).unwrap(), cells);
    }

    #[test]
    fn test_decode_junk_byte() {
        let err = decode(&[b'a', b'q', b'd']).unwrap_err();
        match err {
            crate::error::Error::Symbol { symbol, index } => {
                assert_eq!(symbol, 'q');
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
