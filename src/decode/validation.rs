use crate::error::{Error, Result};

/// Declared-count check for a finished array block. Non-strict callers
/// truncate instead.
pub(crate) fn check_count(
    declared: usize,
    found: usize,
    strict: bool,
    line: usize,
    what: &str,
) -> Result<()> {
    if strict && declared != found {
        return Err(Error::structure(
            line,
            format!("{what} declares {declared} items but {found} were found"),
        ));
    }
    Ok(())
}

pub(crate) fn check_row_width(
    expected: usize,
    found: usize,
    strict: bool,
    line: usize,
) -> Result<()> {
    if strict && expected != found {
        return Err(Error::structure(
            line,
            format!("row has {found} fields but the header declares {expected}"),
        ));
    }
    Ok(())
}

/// Blank lines are only legal between top-level entries; callers invoke
/// this once they know the blank sits inside a block that continues.
pub(crate) fn check_blank_line(strict: bool, line: usize) -> Result<()> {
    if strict {
        return Err(Error::structure(line, "blank line inside a block"));
    }
    Ok(())
}

/// Depth rule: children sit exactly one level below their parent. Strict
/// mode rejects a deeper line; non-strict collapses it to the expected
/// level and returns that.
pub(crate) fn check_depth(expected: usize, found: usize, strict: bool, line: usize) -> Result<usize> {
    if found > expected {
        if strict {
            return Err(Error::structure(
                line,
                format!("expected indentation depth {expected}, found {found}"),
            ));
        }
        return Ok(expected);
    }
    Ok(found)
}
