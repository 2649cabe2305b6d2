//! Turn a box query into contiguous curve-value scans.
use sfc::prelude::*;

fn main() -> Result<()> {
    // An 8x8 grid, 3 bits per axis.
    let curve = Hilbert::new(2, 3)?;

    // The query region, as the reference box predicate.
    let region = Box::new(&[2, 1], &[4, 5]);

    // Coarse decomposition: few spans, some overscan.
    let coarse = curve.decompose_spans(0, 1, &region)?;
    println!("coarse: {:?}", coarse);
    assert_eq!(coarse.len(), 3);

    // Finer decomposition: tighter spans, more predicate work.
    let fine = curve.decompose_spans(0, 2, &region)?;
    println!("fine:   {:?}", fine);
    assert_eq!(fine.len(), 5);

    // Cells name the same coverage hierarchically.
    let cells = curve.decompose_region(0, 1, &region)?;
    println!("cells:  {:?}", cells);

    Ok(())
}
