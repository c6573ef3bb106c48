//! Scalar and array variable storage (spec.md §3 "Variable store").
//!
//! 26 numeric scalars and 26 string scalars, addressed by letter index,
//! plus an orthogonal array namespace holding at most one array per
//! letter (its element type is inferred from which namespace `DIM`/
//! `ARRY` addressed).

use crate::constants::{IMPLICIT_ARRAY_DIM, NUM_VARS};
use crate::error::BasicErrorKind;
use crate::number::Number;
use crate::strings::{StringHandle, EMPTY_STRING};
use crate::value::VarKind;

#[derive(Clone)]
pub struct ArrayNumber {
    dims: Vec<u32>,
    strides: Vec<usize>,
    data: Vec<Number>,
}

#[derive(Clone)]
pub struct ArrayStr {
    dims: Vec<u32>,
    strides: Vec<usize>,
    data: Vec<StringHandle>,
}

fn strides_for(dims: &[u32]) -> Vec<usize> {
    let mut strides = vec![1usize; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * (dims[i + 1] as usize + 1);
    }
    strides
}

fn element_count(dims: &[u32]) -> usize {
    dims.iter().map(|&d| d as usize + 1).product()
}

fn flat_index(dims: &[u32], strides: &[usize], indices: &[u32]) -> Result<usize, BasicErrorKind> {
    if indices.len() != dims.len() {
        return Err(BasicErrorKind::BadSubscript);
    }
    let mut flat = 0usize;
    for ((&idx, &max), &stride) in indices.iter().zip(dims.iter()).zip(strides.iter()) {
        if idx > max {
            return Err(BasicErrorKind::BadSubscript);
        }
        flat += idx as usize * stride;
    }
    Ok(flat)
}

enum Array {
    Number(ArrayNumber),
    Str(ArrayStr),
}

pub struct VariableStore {
    numeric: [Number; NUM_VARS],
    string: [StringHandle; NUM_VARS],
    arrays: [Option<Array>; NUM_VARS],
}

pub fn letter_index(letter: u8) -> Option<u8> {
    let upper = letter.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Some(upper - b'A')
    } else {
        None
    }
}

fn idx(letter: u8) -> usize {
    letter_index(letter).expect("variable letter out of range") as usize
}

impl VariableStore {
    pub fn new() -> VariableStore {
        VariableStore {
            numeric: [crate::number::from_i64(0); NUM_VARS],
            string: [EMPTY_STRING; NUM_VARS],
            arrays: Default::default(),
        }
    }

    /// Zeroes all scalars and drops all arrays, as `INIT`/`RUN` require.
    /// Returns the string handles that were released so the caller can
    /// decrement the heap's refcounts (string array elements included).
    pub fn reset(&mut self) -> Vec<StringHandle> {
        let mut released = Vec::new();
        released.extend(self.string.iter().copied());
        for slot in &self.arrays {
            if let Some(Array::Str(a)) = slot {
                released.extend(a.data.iter().copied());
            }
        }
        self.numeric = [crate::number::from_i64(0); NUM_VARS];
        self.string = [EMPTY_STRING; NUM_VARS];
        self.arrays = Default::default();
        released
    }

    pub fn get_number(&self, letter: u8) -> Number {
        self.numeric[idx(letter)]
    }

    pub fn set_number(&mut self, letter: u8, value: Number) {
        self.numeric[idx(letter)] = value;
    }

    pub fn get_string(&self, letter: u8) -> StringHandle {
        self.string[idx(letter)]
    }

    /// Returns the previous handle, which the caller must release.
    pub fn set_string(&mut self, letter: u8, value: StringHandle) -> StringHandle {
        std::mem::replace(&mut self.string[idx(letter)], value)
    }

    pub fn is_dimensioned(&self, letter: u8) -> bool {
        self.arrays[idx(letter)].is_some()
    }

    pub fn dim_number(&mut self, letter: u8, dims: Vec<u32>) -> Result<(), BasicErrorKind> {
        if self.is_dimensioned(letter) {
            return Err(BasicErrorKind::RedimdArray);
        }
        let strides = strides_for(&dims);
        let count = element_count(&dims);
        self.arrays[idx(letter)] = Some(Array::Number(ArrayNumber {
            data: vec![crate::number::from_i64(0); count],
            dims,
            strides,
        }));
        Ok(())
    }

    pub fn dim_string(&mut self, letter: u8, dims: Vec<u32>) -> Result<(), BasicErrorKind> {
        if self.is_dimensioned(letter) {
            return Err(BasicErrorKind::RedimdArray);
        }
        let strides = strides_for(&dims);
        let count = element_count(&dims);
        self.arrays[idx(letter)] = Some(Array::Str(ArrayStr {
            data: vec![EMPTY_STRING; count],
            dims,
            strides,
        }));
        Ok(())
    }

    /// Implicitly dimensions an array to `IMPLICIT_ARRAY_DIM` elements
    /// per axis on first subscripted use (spec.md §3).
    pub fn ensure_dimensioned(&mut self, letter: u8, kind: VarKind, rank: usize) -> Result<(), BasicErrorKind> {
        if self.is_dimensioned(letter) {
            return Ok(());
        }
        let dims = vec![IMPLICIT_ARRAY_DIM - 1; rank];
        match kind {
            VarKind::Number => self.dim_number(letter, dims),
            VarKind::Str => self.dim_string(letter, dims),
        }
    }

    pub fn array_flat_index(&self, letter: u8, indices: &[u32]) -> Result<usize, BasicErrorKind> {
        match self.arrays[idx(letter)].as_ref() {
            Some(Array::Number(a)) => flat_index(&a.dims, &a.strides, indices),
            Some(Array::Str(a)) => flat_index(&a.dims, &a.strides, indices),
            None => Err(BasicErrorKind::BadSubscript),
        }
    }

    pub fn get_array_number(&self, letter: u8, flat: usize) -> Number {
        match self.arrays[idx(letter)].as_ref() {
            Some(Array::Number(a)) => a.data[flat],
            _ => crate::number::from_i64(0),
        }
    }

    pub fn set_array_number(&mut self, letter: u8, flat: usize, value: Number) {
        if let Some(Array::Number(a)) = self.arrays[idx(letter)].as_mut() {
            a.data[flat] = value;
        }
    }

    pub fn get_array_string(&self, letter: u8, flat: usize) -> StringHandle {
        match self.arrays[idx(letter)].as_ref() {
            Some(Array::Str(a)) => a.data[flat],
            _ => EMPTY_STRING,
        }
    }

    pub fn set_array_string(&mut self, letter: u8, flat: usize, value: StringHandle) -> StringHandle {
        if let Some(Array::Str(a)) = self.arrays[idx(letter)].as_mut() {
            std::mem::replace(&mut a.data[flat], value)
        } else {
            EMPTY_STRING
        }
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        VariableStore::new()
    }
}
