// src/save.rs

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{LaplaceError, Result};
use crate::reorder::Permutation;
use crate::utils::CsrMatrix;

const BIN_MAGIC: &[u8; 8] = b"LQLESBIN";

/// Everything persisted for one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub casename: String,
    pub n: usize,
    pub status: bool,   // Residual check outcome
    pub degen: bool,    // Degenerate matrices were allowed
    pub order: bool,    // Shell reordering was applied
    pub a: CsrMatrix,   // Unpermuted operator
    pub b: Vec<f64>,    // Unpermuted right-hand side
    pub s: Vec<f64>,    // Solution of the unpermuted system
    pub q: Permutation, // Index form of Q, `(Q x)[k] = x[q[k]]`
}

impl CaseRecord {
    /// `<dir>/<casename>.yaml`
    pub fn yaml_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.yaml", self.casename))
    }

    /// `<dir>/<casename>.bin`
    pub fn bin_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.bin", self.casename))
    }
}

/// Writes the portable YAML archive of a case.
pub fn case_save_yaml(record: &CaseRecord, dir: &Path) -> Result<PathBuf> {
    let path = record.yaml_path(dir);
    let writer = BufWriter::new(File::create(&path)?);
    serde_yaml::to_writer(writer, record)?;
    log::info!("wrote {}", path.display());
    Ok(path)
}

/// Reads back a YAML archive written by [`case_save_yaml`].
pub fn case_load_yaml(path: &Path) -> Result<CaseRecord> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_yaml::from_reader(reader)?)
}

fn write_u64<W: Write>(w: &mut W, v: usize) -> std::io::Result<()> {
    w.write_all(&(v as u64).to_le_bytes())
}

fn write_f64_vec<W: Write>(w: &mut W, v: &[f64]) -> std::io::Result<()> {
    for &x in v {
        w.write_all(&x.to_le_bytes())?;
    }
    Ok(())
}

fn write_index_vec<W: Write>(w: &mut W, v: &[usize]) -> std::io::Result<()> {
    for &x in v {
        write_u64(w, x)?;
    }
    Ok(())
}

/// Writes the raw little-endian binary file of a case.
///
/// Layout: magic `LQLESBIN`, `n: u64`, `nnz: u64`, `status: u8`, `degen: u8`,
/// `order: u8`, `row_ptr: [u64; n + 1]`, `col_idx: [u64; nnz]`,
/// `values: [f64; nnz]`, `b: [f64; n]`, `s: [f64; n]`, `q: [u64; n]`.
pub fn case_save_bin(record: &CaseRecord, dir: &Path) -> Result<PathBuf> {
    let path = record.bin_path(dir);
    let mut f = BufWriter::new(File::create(&path)?);

    f.write_all(BIN_MAGIC)?;
    write_u64(&mut f, record.n)?;
    write_u64(&mut f, record.a.nnz())?;
    f.write_all(&[record.status as u8, record.degen as u8, record.order as u8])?;
    write_index_vec(&mut f, &record.a.row_ptr)?;
    write_index_vec(&mut f, &record.a.col_idx)?;
    write_f64_vec(&mut f, &record.a.values)?;
    write_f64_vec(&mut f, &record.b)?;
    write_f64_vec(&mut f, &record.s)?;
    write_index_vec(&mut f, record.q.indices())?;
    f.flush()?;

    log::info!("wrote {}", path.display());
    Ok(path)
}

struct BinReader<R: Read> {
    inner: R,
}

impl<R: Read> BinReader<R> {
    fn bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| LaplaceError::Format(format!("truncated case file: {e}")))?;
        Ok(buf)
    }

    fn index(&mut self) -> Result<usize> {
        Ok(u64::from_le_bytes(self.bytes::<8>()?) as usize)
    }

    fn flag(&mut self) -> Result<bool> {
        match self.bytes::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(LaplaceError::Format(format!("bad flag byte {other}"))),
        }
    }

    fn indices(&mut self, len: usize) -> Result<Vec<usize>> {
        (0..len).map(|_| self.index()).collect()
    }

    fn floats(&mut self, len: usize) -> Result<Vec<f64>> {
        (0..len)
            .map(|_| Ok(f64::from_le_bytes(self.bytes::<8>()?)))
            .collect()
    }
}

fn check_csr(n: usize, nnz: usize, row_ptr: &[usize], col_idx: &[usize]) -> Result<()> {
    if row_ptr.first() != Some(&0) || row_ptr.last() != Some(&nnz) {
        return Err(LaplaceError::Format(format!(
            "row pointers must run from 0 to nnz = {nnz}"
        )));
    }
    if row_ptr.windows(2).any(|w| w[0] > w[1]) {
        return Err(LaplaceError::Format("row pointers are not monotone".to_string()));
    }
    if let Some(&c) = col_idx.iter().find(|&&c| c >= n) {
        return Err(LaplaceError::Format(format!("column index {c} out of range for n = {n}")));
    }
    Ok(())
}

/// Reads a binary file written by [`case_save_bin`]; the case name is the file stem.
pub fn case_load_bin(path: &Path) -> Result<CaseRecord> {
    let mut r = BinReader { inner: BufReader::new(File::open(path)?) };
    if &r.bytes::<8>()? != BIN_MAGIC {
        return Err(LaplaceError::Format(format!("{} is not a case file", path.display())));
    }
    let n = r.index()?;
    let nnz = r.index()?;
    let status = r.flag()?;
    let degen = r.flag()?;
    let order = r.flag()?;
    let rows = n
        .checked_add(1)
        .ok_or_else(|| LaplaceError::Format(format!("bad matrix dimension {n}")))?;
    let row_ptr = r.indices(rows)?;
    let col_idx = r.indices(nnz)?;
    check_csr(n, nnz, &row_ptr, &col_idx)?;
    let values = r.floats(nnz)?;
    let b = r.floats(n)?;
    let s = r.floats(n)?;
    let q = Permutation::from_vec(r.indices(n)?)
        .map_err(|e| LaplaceError::Format(e.to_string()))?;

    let casename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("case")
        .to_string();
    Ok(CaseRecord {
        casename,
        n,
        status,
        degen,
        order,
        a: CsrMatrix { rows: n, cols: n, row_ptr, col_idx, values },
        b,
        s,
        q,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reorder::shell_ordering;

    fn record() -> CaseRecord {
        let a = CsrMatrix::from_triplets(
            3,
            3,
            &[(0, 0, 2.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 2.0), (1, 2, -1.0), (2, 1, -1.0), (2, 2, 2.0)],
        );
        CaseRecord {
            casename: "tri3".to_string(),
            n: 3,
            status: true,
            degen: false,
            order: true,
            a,
            b: vec![1.0, 0.0, 1.0],
            s: vec![1.0, 1.0, 1.0],
            q: shell_ordering(3, 1, 1),
        }
    }

    #[test]
    fn test_yaml_archive() {
        let dir = tempfile::tempdir().unwrap();
        let rec = record();
        let path = case_save_yaml(&rec, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("tri3.yaml"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("casename: tri3"));
        assert!(text.contains("status: true"));
        assert_eq!(case_load_yaml(&path).unwrap(), rec);
    }

    #[test]
    fn test_bin_layout() {
        let dir = tempfile::tempdir().unwrap();
        let rec = record();
        let path = case_save_bin(&rec, dir.path()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        // header + row_ptr + col_idx + values + b + s + q
        let expected = 8 + 8 + 8 + 3 + 8 * 4 + 8 * 7 + 8 * 7 + 8 * 3 + 8 * 3 + 8 * 3;
        assert_eq!(bytes.len(), expected);
        assert_eq!(&bytes[..8], b"LQLESBIN");
        assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 3);
        assert_eq!(u64::from_le_bytes(bytes[16..24].try_into().unwrap()), 7);
        assert_eq!(&bytes[24..27], &[1, 0, 1]);

        assert_eq!(case_load_bin(&path).unwrap(), rec);
    }

    fn header(n: u64, nnz: u64) -> Vec<u8> {
        let mut bytes = b"LQLESBIN".to_vec();
        bytes.extend_from_slice(&n.to_le_bytes());
        bytes.extend_from_slice(&nnz.to_le_bytes());
        bytes.extend_from_slice(&[1, 0, 0]);
        bytes
    }

    #[test]
    fn test_bin_rejects_bad_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.bin");
        std::fs::write(&path, header(u64::MAX, 0)).unwrap();
        assert!(matches!(case_load_bin(&path), Err(LaplaceError::Format(_))));
    }

    #[test]
    fn test_bin_rejects_bad_csr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bin");
        let write = |row_ptr: [u64; 3], col_idx: [u64; 2]| {
            let mut bytes = header(2, 2);
            for v in row_ptr.iter().chain(col_idx.iter()) {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            // values, b, s
            bytes.extend(std::iter::repeat(0u8).take(8 * 6));
            for v in [0u64, 1] {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            std::fs::write(&path, bytes).unwrap();
        };

        write([0, 1, 2], [0, 1]);
        assert!(case_load_bin(&path).is_ok());

        write([0, 1, 3], [0, 1]);
        assert!(matches!(case_load_bin(&path), Err(LaplaceError::Format(_))));
        write([0, 3, 2], [0, 1]);
        assert!(matches!(case_load_bin(&path), Err(LaplaceError::Format(_))));
        write([0, 1, 2], [0, 2]);
        assert!(matches!(case_load_bin(&path), Err(LaplaceError::Format(_))));
    }

    #[test]
    fn test_bin_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.bin");
        std::fs::write(&path, b"LQLESBIN\x01").unwrap();
        assert!(matches!(case_load_bin(&path), Err(LaplaceError::Format(_))));
        std::fs::write(&path, b"NOTACASEFILE").unwrap();
        assert!(matches!(case_load_bin(&path), Err(LaplaceError::Format(_))));
    }
}
