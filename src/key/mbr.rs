//! key/mbr — minimum bounding rectangle, закодированный в user key.
//!
//! Формат (LE): для каждого измерения [min f64][max f64], т.е. 16·d байт:
//!   min0, max0, min1, max1, ...
//! Пересечение — по замкнутым интервалам во всех измерениях.

use byteorder::{ByteOrder, LittleEndian};

use crate::consts::MBR_DIM_SIZE;

#[derive(Debug, Clone, PartialEq)]
pub struct Mbr {
    bounds: Vec<(f64, f64)>,
}

impl Mbr {
    /// Построить прямоугольник. None, если измерений нет, min > max или есть NaN.
    pub fn new(bounds: Vec<(f64, f64)>) -> Option<Self> {
        if bounds.is_empty() {
            return None;
        }
        for &(lo, hi) in &bounds {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return None;
            }
        }
        Some(Self { bounds })
    }

    /// Разобрать user key как прямоугольник.
    pub fn decode(user_key: &[u8]) -> Option<Self> {
        if user_key.is_empty() || user_key.len() % MBR_DIM_SIZE != 0 {
            return None;
        }
        let bounds = user_key
            .chunks_exact(MBR_DIM_SIZE)
            .map(|d| (LittleEndian::read_f64(&d[0..8]), LittleEndian::read_f64(&d[8..16])))
            .collect();
        Self::new(bounds)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.bounds.len() * MBR_DIM_SIZE];
        for (i, &(lo, hi)) in self.bounds.iter().enumerate() {
            let base = i * MBR_DIM_SIZE;
            LittleEndian::write_f64(&mut out[base..base + 8], lo);
            LittleEndian::write_f64(&mut out[base + 8..base + 16], hi);
        }
        out
    }

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.bounds.len()
    }

    #[inline]
    pub fn bounds(&self) -> &[(f64, f64)] {
        &self.bounds
    }

    /// Пересекаются ли прямоугольники. Разная размерность — не пересекаются.
    pub fn intersects(&self, other: &Mbr) -> bool {
        if self.bounds.len() != other.bounds.len() {
            return false;
        }
        self.bounds
            .iter()
            .zip(other.bounds.iter())
            .all(|(&(alo, ahi), &(blo, bhi))| alo <= bhi && blo <= ahi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bx(x0: f64, x1: f64, y0: f64, y1: f64) -> Mbr {
        Mbr::new(vec![(x0, x1), (y0, y1)]).unwrap()
    }

    #[test]
    fn decode_encoded_box() {
        let m = bx(-1.5, 2.0, 10.0, 11.25);
        let d = Mbr::decode(&m.encode()).expect("must decode");
        assert_eq!(d, m);
        assert_eq!(d.dimensions(), 2);
    }

    #[test]
    fn decode_rejects_bad_lengths_and_inverted() {
        assert!(Mbr::decode(b"").is_none());
        assert!(Mbr::decode(&[0u8; 15]).is_none());
        let inverted = Mbr { bounds: vec![(3.0, 1.0)] }.encode();
        assert!(Mbr::decode(&inverted).is_none());
    }

    #[test]
    fn intersection_is_closed() {
        let a = bx(0.0, 1.0, 0.0, 1.0);
        assert!(a.intersects(&bx(1.0, 2.0, 1.0, 2.0)));
        assert!(a.intersects(&bx(0.25, 0.5, -5.0, 5.0)));
        assert!(!a.intersects(&bx(1.01, 2.0, 0.0, 1.0)));
        assert!(!a.intersects(&Mbr::new(vec![(0.0, 1.0)]).unwrap()));
    }

    #[test]
    fn new_rejects_nan() {
        assert!(Mbr::new(vec![(f64::NAN, 1.0)]).is_none());
        assert!(Mbr::new(vec![]).is_none());
    }
}
