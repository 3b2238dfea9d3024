//! Reader for MATLAB Level-5 MAT files.
//!
//! Covers what signal extraction needs: numeric arrays and struct arrays,
//! plain or zlib-compressed, in either byte order.
//!
//! TODO: Read complex `Ve` arrays once a magnitude convention is agreed on.

use std::io::Read;

use flate2::read::ZlibDecoder;

const HEADER_LEN: usize = 128;

const MI_INT8: u32 = 1;
const MI_UINT8: u32 = 2;
const MI_INT16: u32 = 3;
const MI_UINT16: u32 = 4;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_SINGLE: u32 = 7;
const MI_DOUBLE: u32 = 9;
const MI_INT64: u32 = 12;
const MI_UINT64: u32 = 13;
const MI_MATRIX: u32 = 14;
const MI_COMPRESSED: u32 = 15;

const MX_STRUCT: u32 = 2;
const FLAG_COMPLEX: u32 = 0x0800;

/// A decoded MAT variable.
#[derive(Clone, Debug, PartialEq)]
pub enum MatValue {
    /// Real numeric array, column-major.
    Numeric { dims: Vec<usize>, real: Vec<f64> },
    /// Struct array; every field holds one value per element.
    Struct {
        dims: Vec<usize>,
        fields: Vec<(String, Vec<MatValue>)>,
    },
    /// Any class the scorer does not read (cell, char, sparse, ...).
    Unsupported { class: u32 },
}

impl MatValue {
    /// Field `name` of the first struct element.
    pub fn field(&self, name: &str) -> Option<&MatValue> {
        match self {
            MatValue::Struct { fields, .. } => fields
                .iter()
                .find(|(field, _)| field == name)
                .and_then(|(_, values)| values.first()),
            _ => None,
        }
    }

    /// Rows of a real 2-D array.
    pub fn to_rows(&self) -> Result<Vec<Vec<f64>>, String> {
        match self {
            MatValue::Numeric { dims, real } => {
                if dims.len() != 2 {
                    return Err(format!("expected a 2-D array, found {} dimensions", dims.len()));
                }
                let (rows, cols) = (dims[0], dims[1]);
                Ok((0..rows)
                    .map(|r| (0..cols).map(|c| real[c * rows + r]).collect())
                    .collect())
            }
            MatValue::Struct { .. } => Err("expected a numeric array, found a struct".to_string()),
            MatValue::Unsupported { class } => {
                Err(format!("expected a numeric array, found class {class}"))
            }
        }
    }
}

/// Top-level variables of a MAT file, in file order.
#[derive(Clone, Debug, Default)]
pub struct MatFile {
    vars: Vec<(String, MatValue)>,
}

impl MatFile {
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() < HEADER_LEN {
            return Err("file is shorter than a MAT header".to_string());
        }
        let big_endian = match &bytes[126..128] {
            b"IM" => false,
            b"MI" => true,
            _ => return Err("not a Level-5 MAT file".to_string()),
        };

        let mut cur = Cursor::new(&bytes[HEADER_LEN..], big_endian);
        let mut file = MatFile::default();
        while !cur.is_empty() {
            let (ty, data) = cur.element()?;
            match ty {
                MI_MATRIX => file.vars.push(parse_matrix(data, big_endian)?),
                MI_COMPRESSED => {
                    let mut inflated = Vec::new();
                    ZlibDecoder::new(data)
                        .read_to_end(&mut inflated)
                        .map_err(|e| format!("corrupt compressed element: {e}"))?;
                    let mut inner = Cursor::new(&inflated, big_endian);
                    let (ty, data) = inner.element()?;
                    if ty == MI_MATRIX {
                        file.vars.push(parse_matrix(data, big_endian)?);
                    }
                }
                _ => {}
            }
        }
        Ok(file)
    }

    pub fn get(&self, name: &str) -> Option<&MatValue> {
        self.vars
            .iter()
            .find(|(var, _)| var == name)
            .map(|(_, value)| value)
    }
}

fn parse_matrix(data: &[u8], big_endian: bool) -> Result<(String, MatValue), String> {
    if data.is_empty() {
        return Ok((String::new(), MatValue::Numeric { dims: vec![0, 0], real: Vec::new() }));
    }
    let mut cur = Cursor::new(data, big_endian);

    let (_, flags) = cur.element()?;
    let flags = cur.words_u32(flags)?;
    let flag = *flags.first().ok_or("missing array flags")?;
    let class = flag & 0xff;

    let (_, dims) = cur.element()?;
    let dims: Vec<usize> = cur
        .words_i32(dims)?
        .into_iter()
        .map(|d| usize::try_from(d).map_err(|_| format!("negative dimension {d}")))
        .collect::<Result<_, _>>()?;
    let count: usize = dims.iter().product();

    let (_, name) = cur.element()?;
    let name = String::from_utf8_lossy(name).trim_end_matches('\0').to_string();

    let value = match class {
        MX_STRUCT => {
            let (_, len) = cur.element()?;
            let field_len = *cur.words_i32(len)?.first().ok_or("missing field name length")?;
            let field_len = usize::try_from(field_len)
                .ok()
                .filter(|len| *len > 0)
                .ok_or("invalid field name length")?;
            let (_, raw_names) = cur.element()?;
            let names: Vec<String> = raw_names
                .chunks(field_len)
                .map(|chunk| {
                    let end = chunk.iter().position(|b| *b == 0).unwrap_or(chunk.len());
                    String::from_utf8_lossy(&chunk[..end]).into_owned()
                })
                .collect();

            let mut fields: Vec<(String, Vec<MatValue>)> =
                names.into_iter().map(|n| (n, Vec::with_capacity(count))).collect();
            for _ in 0..count {
                for (_, values) in fields.iter_mut() {
                    let (ty, sub) = cur.element()?;
                    if ty != MI_MATRIX {
                        return Err(format!("struct field holds data type {ty}, expected a matrix"));
                    }
                    values.push(parse_matrix(sub, big_endian)?.1);
                }
            }
            MatValue::Struct { dims, fields }
        }
        6..=15 if flag & FLAG_COMPLEX != 0 => MatValue::Unsupported { class },
        6..=15 => {
            let (ty, raw) = cur.element()?;
            let real = cur.numbers(ty, raw)?;
            if real.len() != count {
                return Err(format!(
                    "array \"{name}\" holds {} values, dimensions need {count}",
                    real.len()
                ));
            }
            MatValue::Numeric { dims, real }
        }
        _ => MatValue::Unsupported { class },
    };
    Ok((name, value))
}

/// Byte cursor over tagged data elements.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    big_endian: bool,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8], big_endian: bool) -> Self {
        Self {
            buf,
            pos: 0,
            big_endian,
        }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], String> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.buf.len())
            .ok_or("data element runs past the end of the file")?;
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn u32_at(&self, raw: &[u8]) -> u32 {
        let word = [raw[0], raw[1], raw[2], raw[3]];
        if self.big_endian {
            u32::from_be_bytes(word)
        } else {
            u32::from_le_bytes(word)
        }
    }

    /// Next element as (data type, payload). Small elements pack the type and
    /// length into the first word.
    fn element(&mut self) -> Result<(u32, &'a [u8]), String> {
        let first = self.take(4)?;
        let first = self.u32_at(first);
        if first >> 16 != 0 {
            let len = (first >> 16) as usize;
            let data = self.take(4)?;
            if len > 4 {
                return Err(format!("small data element claims {len} bytes"));
            }
            return Ok((first & 0xffff, &data[..len]));
        }

        let len_word = self.take(4)?;
        let len = self.u32_at(len_word) as usize;
        let data = self.take(len)?;
        let pad = (8 - len % 8) % 8;
        self.pos = (self.pos + pad).min(self.buf.len());
        Ok((first, data))
    }

    fn words_u32(&self, raw: &[u8]) -> Result<Vec<u32>, String> {
        Ok(raw.chunks_exact(4).map(|w| self.u32_at(w)).collect())
    }

    fn words_i32(&self, raw: &[u8]) -> Result<Vec<i32>, String> {
        Ok(raw.chunks_exact(4).map(|w| self.u32_at(w) as i32).collect())
    }

    fn numbers(&self, ty: u32, raw: &[u8]) -> Result<Vec<f64>, String> {
        let be = self.big_endian;
        macro_rules! decode {
            ($t:ty) => {{
                const N: usize = std::mem::size_of::<$t>();
                raw.chunks_exact(N)
                    .map(|chunk| {
                        let mut bytes = [0u8; N];
                        bytes.copy_from_slice(chunk);
                        let v = if be {
                            <$t>::from_be_bytes(bytes)
                        } else {
                            <$t>::from_le_bytes(bytes)
                        };
                        v as f64
                    })
                    .collect()
            }};
        }
        Ok(match ty {
            MI_INT8 => decode!(i8),
            MI_UINT8 => decode!(u8),
            MI_INT16 => decode!(i16),
            MI_UINT16 => decode!(u16),
            MI_INT32 => decode!(i32),
            MI_UINT32 => decode!(u32),
            MI_SINGLE => decode!(f32),
            MI_DOUBLE => decode!(f64),
            MI_INT64 => decode!(i64),
            MI_UINT64 => decode!(u64),
            other => return Err(format!("unsupported numeric data type {other}")),
        })
    }
}
