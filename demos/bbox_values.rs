//! Find the curve-value range an axis-aligned box occupies.
use sfc::prelude::*;

fn main() -> Result<()> {
    // The extrema calls overwrite their inputs with the winning
    // coordinates, so each gets its own copy of the bounds.
    let (mut lo_min, mut lo_max) = ([1u64, 2], [3u64, 5]);
    let lower = bbox_lower_value(3, &mut lo_min, &mut lo_max)?;
    println!("first visited point {:?} at value {}", lo_min, lower);

    let (mut hi_min, mut hi_max) = ([1u64, 2], [3u64, 5]);
    let upper = bbox_upper_value(3, &mut hi_min, &mut hi_max)?;
    println!("last visited point  {:?} at value {}", hi_max, upper);

    assert!(lower <= upper);
    assert_eq!(encode(3, &lo_min), lower);
    assert_eq!(encode(3, &hi_max), upper);

    Ok(())
}
