use crate::clarity::ClarityValue;
use std::collections::BTreeMap;

pub const BOARD_CELLS: usize = 64;

pub const CODE_EMPTY: u8 = 0;
pub const CODE_P1_MAN: u8 = 1;
pub const CODE_P1_KING: u8 = 2;
pub const CODE_P2_MAN: u8 = 3;
pub const CODE_P2_KING: u8 = 4;

/// Dense board model: exactly 64 piece codes, row-major from position 0.
/// Codes outside the known range are carried through untouched as far as
/// one byte allows; rendering them is the display layer's problem.
#[derive(Clone, PartialEq, Eq)]
pub struct BoardState([u8; BOARD_CELLS]);

impl BoardState {
    pub fn empty() -> Self {
        Self([CODE_EMPTY; BOARD_CELLS])
    }

    pub fn cells(&self) -> &[u8; BOARD_CELLS] {
        &self.0
    }

    pub fn code_at(&self, position: usize) -> Option<u8> {
        self.0.get(position).copied()
    }
}

impl std::fmt::Debug for BoardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.0.chunks(8) {
            for code in row {
                write!(f, "{code}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Decodes the ledger's sparse per-position storage into a dense board.
/// Total: every one of the 64 canonical labels (`p0`..`p63`) is consulted;
/// an absent entry or an explicit `none` is an empty cell.
pub fn decode_board(entries: &BTreeMap<String, ClarityValue>) -> BoardState {
    let mut cells = [CODE_EMPTY; BOARD_CELLS];
    for (position, cell) in cells.iter_mut().enumerate() {
        let label = format!("p{position}");
        let Some(value) = entries.get(&label) else {
            continue;
        };
        match value {
            ClarityValue::OptionalSome(inner) => {
                if let ClarityValue::Uint(code) = inner.as_ref() {
                    *cell = clamp_code(*code);
                }
            }
            // tolerate an unwrapped uint for contracts that store bare codes
            ClarityValue::Uint(code) => *cell = clamp_code(*code),
            _ => {}
        }
    }
    BoardState(cells)
}

// a cell holds one byte; a wider wire value saturates rather than wrapping
fn clamp_code(code: u128) -> u8 {
    u8::try_from(code).unwrap_or(u8::MAX)
}
