use std::fs;

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{i64 as parse_i64, space0, space1, u64 as parse_u64};
use nom::combinator::{all_consuming, opt};
use nom::sequence::{preceded, terminated, tuple};

use crate::color::{ConflictEdge, Weight};
use crate::error::{ColoringError, ColoringResult};


/** reads a weighted DIMACS instance from file, returns (n, edges)
accepted lines:
 - `c ...`: comment
 - `p edge n m` or `p col n m`: header
 - `e u v [w]`: edge between u and v (indices start at 1), weight 1 if omitted
*/
pub fn read_from_file(filename:&str) -> ColoringResult<(usize, Vec<ConflictEdge>)> {
    let content = fs::read_to_string(filename)?;
    read_from_str(&content)
}

/// reads a weighted DIMACS instance from a string, returns (n, edges)
pub fn read_from_str(content:&str) -> ColoringResult<(usize, Vec<ConflictEdge>)> {
    let mut header:Option<(usize,usize)> = None;
    let mut edges = Vec::new();
    for (line_nb, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') { continue; }
        let parse_error = |what:&str| ColoringError::Parse(
            format!("line {}: {} ({})", line_nb+1, what, line)
        );
        if line.starts_with('p') {
            let (_,(n,m)) = read_header(line).map_err(|_| parse_error("invalid header"))?;
            header = Some((n,m));
            edges.reserve(m);
            continue;
        }
        let n = match header {
            None => return Err(parse_error("edge before header")),
            Some((n,_)) => n
        };
        let (_,(a,b,w)) = read_edge(line).map_err(|_| parse_error("invalid edge"))?;
        if a == 0 || b == 0 || a > n || b > n {
            return Err(parse_error("vertex index out of range"));
        }
        edges.push(ConflictEdge { u:a-1, v:b-1, weight:w });
    }
    match header {
        None => Err(ColoringError::Parse("missing header".to_string())),
        Some((n,m)) => {
            if edges.len() != m && 2*edges.len() != m {
                log::warn!("header announces {} edges, {} read", m, edges.len());
            }
            Ok((n, edges))
        }
    }
}

/// reads a vertex index
fn read_index(s:&str) -> IResult<&str, usize> {
    let (remaining, x) = parse_u64(s)?;
    Ok((remaining, x as usize))
}

/// reads header containing (n,m)
pub fn read_header(s:&str) -> IResult<&str, (usize,usize)> {
    all_consuming(terminated(
        preceded(
            alt((tag("p edge"), tag("p col"))),
            tuple((preceded(space1, read_index), preceded(space1, read_index)))
        ),
        space0
    ))(s)
}

/// reads edge line (WARNING: indices start at 1 in the DIMACS format)
pub fn read_edge(s:&str) -> IResult<&str, (usize,usize,Weight)> {
    let (remaining, (a, b, w)) = all_consuming(terminated(
        preceded(
            tag("e"),
            tuple((
                preceded(space1, read_index),
                preceded(space1, read_index),
                opt(preceded(space1, parse_i64)),
            ))
        ),
        space0
    ))(s)?;
    Ok((remaining, (a, b, w.unwrap_or(1))))
}
