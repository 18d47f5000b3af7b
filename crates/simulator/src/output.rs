use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use quantum::Distribution;

use crate::sweep::SweepRow;

/// Row-major position distribution, one coordinate column per axis.
pub fn write_distribution<P: AsRef<Path>>(path: P, dist: &Distribution) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);

    let axes: Vec<String> = (0..dist.shape.len()).map(|a| format!("x{}", a)).collect();
    writeln!(w, "{},probability", axes.join(","))?;

    for (flat, p) in dist.values.iter().enumerate() {
        let mut coords = vec![0usize; dist.shape.len()];
        let mut rest = flat;
        for (c, &n) in coords.iter_mut().zip(&dist.shape).rev() {
            *c = rest % n;
            rest /= n;
        }
        let coords: Vec<String> = coords.iter().map(|c| c.to_string()).collect();
        writeln!(w, "{},{}", coords.join(","), p)?;
    }
    w.flush()
}

pub fn write_sweep<P: AsRef<Path>>(path: P, rows: &[SweepRow]) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "rate,entropy,origin,spread")?;
    for r in rows {
        writeln!(w, "{},{},{},{}", r.rate, r.entropy, r.origin, r.spread)?;
    }
    w.flush()
}
