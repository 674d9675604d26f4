//! Text file formats: meshes, problem summaries and nodal solutions.
//!
//! All three are line-oriented text with C `printf` number formatting, so
//! files written here can be diffed against files produced by other tools
//! using the same layout. Each format has a stream form working on
//! [`Write`]/[`BufRead`] and a `_file` form taking a path.
//!
//! # Mesh layout
//!
//! ```text
//! Number of nodes 4
//!      0 :  0.0000000e+00  0.0000000e+00
//! ...
//! Number of edges 4
//!      0 :      0      1
//! ...
//! Number of triangles 2
//!      0 :      0      1      2
//! ...
//! Number of domains 1
//!   Domain :      0
//!   Name : Bottom
//!   Number of elements :      1
//!      0
//! ```

use crate::cfmt;
use crate::element::ElementShape;
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::material::ElasticCase;
use crate::mesh::{Domain, Mesh, NodeSet};
use crate::problem::ElasticityProblem;
use crate::types::Point2;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Domain edge indices written per line.
const DOMAIN_EDGES_PER_LINE: usize = 10;

/// Upper bound on reserved capacity for counts read from a file header.
const PREALLOC_LIMIT: usize = 4096;

fn create(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

// ---------------------------------------------------------------------------
// Mesh
// ---------------------------------------------------------------------------

/// Write a geometry in the mesh text format.
pub fn write_mesh<W: Write>(geometry: &Geometry, mut out: W) -> Result<()> {
    let nodes = geometry.nodes();
    writeln!(out, "Number of nodes {} ", nodes.len())?;
    for (i, p) in nodes.coords().iter().enumerate() {
        writeln!(
            out,
            "{i:6} : {} {} ",
            cfmt::exp_width(p.x, 14, 7),
            cfmt::exp_width(p.y, 14, 7)
        )?;
    }

    let edges = geometry.edges();
    writeln!(out, "Number of edges {} ", edges.n_elements())?;
    for (i, edge) in edges.elements().enumerate() {
        writeln!(out, "{i:6} : {:6} {:6} ", edge[0], edge[1])?;
    }

    let elements = geometry.elements();
    let family = match elements.shape() {
        ElementShape::Quad => "quads",
        _ => "triangles",
    };
    writeln!(out, "Number of {family} {} ", elements.n_elements())?;
    for (i, element) in elements.elements().enumerate() {
        write!(out, "{i:6} :")?;
        for node in element {
            write!(out, " {node:6}")?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Number of domains {}", geometry.domains().len())?;
    for (i, domain) in geometry.domains().iter().enumerate() {
        writeln!(out, "  Domain : {i:6} ")?;
        writeln!(out, "  Name : {}", domain.name())?;
        writeln!(out, "  Number of elements : {:6}", domain.edges().len())?;
        let n = domain.edges().len();
        for (j, edge) in domain.edges().iter().enumerate() {
            write!(out, "{edge:6}")?;
            if j + 1 != n && (j + 1) % DOMAIN_EDGES_PER_LINE == 0 {
                writeln!(out)?;
            }
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_mesh_file(geometry: &Geometry, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_mesh(geometry, create(path)?)?;
    debug!(path = %path.display(), "mesh written");
    Ok(())
}

/// Line source that tracks 1-based line numbers and skips blank lines.
struct Lines<R> {
    inner: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(input: R) -> Self {
        Self {
            inner: input.lines(),
            line: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    /// Next non-blank line as written, without its line terminator.
    fn next_raw(&mut self, what: &str) -> Result<String> {
        for text in self.inner.by_ref() {
            self.line += 1;
            let text = text?;
            if !text.trim().is_empty() {
                return Ok(text.trim_end_matches('\r').to_string());
            }
        }
        Err(self.error(format!("unexpected end of file, expected {what}")))
    }

    /// Next non-blank line, trimmed.
    fn next(&mut self, what: &str) -> Result<String> {
        Ok(self.next_raw(what)?.trim().to_string())
    }

    /// Value following `label` on the next line, e.g. `Number of nodes 12`.
    fn labelled(&mut self, label: &str) -> Result<String> {
        let text = self.next(label)?;
        let rest = strip_label(&text, label).ok_or_else(|| {
            self.error(format!("expected {label:?}, found {text:?}"))
        })?;
        Ok(rest.trim_start().trim_start_matches(':').trim().to_string())
    }

    fn labelled_count(&mut self, label: &str) -> Result<usize> {
        let value = self.labelled(label)?;
        self.parse(&value, label)
    }

    /// Domain name after `Name :`. Text after the separator is kept as
    /// written, trailing spaces included.
    fn name(&mut self) -> Result<String> {
        let text = self.next_raw("Name")?;
        let rest = strip_label(&text, "Name")
            .ok_or_else(|| self.error(format!("expected \"Name\", found {:?}", text.trim())))?
            .trim_start();
        let rest = rest.strip_prefix(':').unwrap_or(rest);
        Ok(rest.trim_start().to_string())
    }

    /// `a * b`, or a parse error naming the oversized quantity.
    fn product(&self, a: usize, b: usize, what: &str) -> Result<usize> {
        a.checked_mul(b)
            .ok_or_else(|| self.error(format!("{what} {a} x {b} is too large")))
    }

    fn parse<T: std::str::FromStr>(&self, token: &str, what: &str) -> Result<T> {
        token
            .parse()
            .map_err(|_| self.error(format!("invalid {what}: {token:?}")))
    }

    /// Split an `index : values...` record, checking the index.
    fn record(&mut self, expected_index: usize, what: &str) -> Result<Vec<String>> {
        let text = self.next(what)?;
        let (index, values) = text
            .split_once(':')
            .ok_or_else(|| self.error(format!("expected \"index : values\" for {what}")))?;
        let index: usize = self.parse(index.trim(), "record index")?;
        if index != expected_index {
            return Err(self.error(format!(
                "{what} record {index} out of order, expected {expected_index}"
            )));
        }
        Ok(values.split_whitespace().map(str::to_string).collect())
    }
}

/// Case-insensitive prefix match on whitespace-separated words.
fn strip_label<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let mut rest = text;
    for word in label.split_whitespace() {
        rest = rest.trim_start();
        let head = rest.get(..word.len())?;
        if !head.eq_ignore_ascii_case(word) {
            return None;
        }
        rest = &rest[word.len()..];
    }
    Some(rest)
}

/// Read a geometry from the mesh text format.
///
/// Whitespace is free-form and the element family is matched
/// case-insensitively. Malformed input yields [`Error::Parse`] with the
/// offending line.
pub fn read_mesh<R: BufRead>(input: R) -> Result<Geometry> {
    let mut lines = Lines::new(input);

    let n_nodes = lines.labelled_count("Number of nodes")?;
    let mut coords = Vec::with_capacity(n_nodes.min(PREALLOC_LIMIT));
    for i in 0..n_nodes {
        let values = lines.record(i, "node")?;
        if values.len() != 2 {
            return Err(lines.error(format!(
                "node {i} needs 2 coordinates, found {}",
                values.len()
            )));
        }
        let x: f64 = lines.parse(&values[0], "x coordinate")?;
        let y: f64 = lines.parse(&values[1], "y coordinate")?;
        coords.push(Point2::new(x, y));
    }

    let n_edges = lines.labelled_count("Number of edges")?;
    let edge_table = read_connectivity(&mut lines, n_edges, ElementShape::Edge)?;

    let family = lines.labelled("Number of")?;
    let (kind, count) = family.split_once(char::is_whitespace).ok_or_else(|| {
        lines.error(format!("expected element family and count, found {family:?}"))
    })?;
    let shape = if kind.eq_ignore_ascii_case("triangles") {
        ElementShape::Triangle
    } else if kind.eq_ignore_ascii_case("quads") {
        ElementShape::Quad
    } else {
        return Err(lines.error(format!("unknown element family {kind:?}")));
    };
    let n_elements: usize = lines.parse(count.trim(), "element count")?;
    let element_table = read_connectivity(&mut lines, n_elements, shape)?;

    let n_domains = lines.labelled_count("Number of domains")?;
    let mut domains = Vec::with_capacity(n_domains.min(PREALLOC_LIMIT));
    for i in 0..n_domains {
        let index: usize = {
            let value = lines.labelled("Domain")?;
            lines.parse(&value, "domain index")?
        };
        if index != i {
            return Err(lines.error(format!("domain {index} out of order, expected {i}")));
        }
        let name = lines.name()?;
        let n = lines.labelled_count("Number of elements")?;
        let mut edges = Vec::with_capacity(n.min(PREALLOC_LIMIT));
        while edges.len() < n {
            let text = lines.next("domain edge indices")?;
            for token in text.split_whitespace() {
                edges.push(lines.parse::<usize>(token, "edge index")?);
            }
        }
        if edges.len() != n {
            return Err(lines.error(format!(
                "domain {name:?} lists {} edges, expected {n}",
                edges.len()
            )));
        }
        domains.push(Domain::new(name, edges));
    }

    let nodes = NodeSet::new(coords);
    let edges = Mesh::new(ElementShape::Edge, edge_table, n_nodes)?;
    let elements = Mesh::new(shape, element_table, n_nodes)?;
    Geometry::new(nodes, edges, elements, domains)
}

fn read_connectivity<R: BufRead>(
    lines: &mut Lines<R>,
    count: usize,
    shape: ElementShape,
) -> Result<Vec<usize>> {
    let n_local = shape.n_nodes();
    let len = lines.product(count, n_local, &format!("{shape} table"))?;
    let mut table = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    for i in 0..count {
        let values = lines.record(i, &shape.to_string())?;
        if values.len() != n_local {
            return Err(lines.error(format!(
                "{shape} {i} has {} nodes, expected {n_local}",
                values.len()
            )));
        }
        for value in &values {
            table.push(lines.parse::<usize>(value, "node index")?);
        }
    }
    Ok(table)
}

pub fn read_mesh_file(path: impl AsRef<Path>) -> Result<Geometry> {
    let path = path.as_ref();
    let geometry = read_mesh(open(path)?)?;
    debug!(
        path = %path.display(),
        nodes = geometry.nodes().len(),
        elements = geometry.elements().n_elements(),
        "mesh read"
    );
    Ok(geometry)
}

// ---------------------------------------------------------------------------
// Problem summary
// ---------------------------------------------------------------------------

/// Write the human-readable problem summary (material, load, conditions).
pub fn write_problem<W: Write>(problem: &ElasticityProblem, mut out: W) -> Result<()> {
    let kind = match problem.case() {
        ElasticCase::PlaneStress => "Planar stresses  ",
        ElasticCase::PlaneStrain => "Planar strains ",
        ElasticCase::Axisymmetric => "Axi-symetric problem ",
    };
    writeln!(out, "Type of problem    :  {kind}")?;
    let material = problem.material();
    writeln!(out, "Young modulus      : {}  ", cfmt::exp_width(material.youngs_modulus, 14, 7))?;
    writeln!(out, "Poisson ratio      : {}  ", cfmt::exp_width(material.poissons_ratio, 14, 7))?;
    writeln!(out, "Mass density       : {}  ", cfmt::exp_width(material.density, 14, 7))?;
    writeln!(out, "Gravity-Y          : {}  ", cfmt::exp_width(problem.gravity(), 14, 7))?;

    for condition in problem.conditions() {
        let name = problem
            .geometry()
            .domain(condition.domain)
            .map_or("", |d| d.name());
        writeln!(
            out,
            "Boundary condition :  {:<19}= {}: {name}",
            condition.kind.label(),
            cfmt::exp_width(condition.value, 14, 7)
        )?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_problem_file(problem: &ElasticityProblem, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_problem(problem, create(path)?)?;
    debug!(path = %path.display(), "problem summary written");
    Ok(())
}

// ---------------------------------------------------------------------------
// Solution
// ---------------------------------------------------------------------------

/// Nodal field table read back from a solution file.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionData {
    pub n_nodes: usize,
    pub n_fields: usize,
    /// Row-major, `n_fields` values per node.
    pub data: Vec<f64>,
}

impl SolutionData {
    /// Values of one node.
    pub fn node(&self, node: usize) -> &[f64] {
        &self.data[node * self.n_fields..(node + 1) * self.n_fields]
    }
}

/// Write `n_fields` values per node at full precision.
pub fn write_solution<W: Write>(
    n_nodes: usize,
    n_fields: usize,
    data: &[f64],
    mut out: W,
) -> Result<()> {
    if n_fields == 0 || data.len() != n_nodes * n_fields {
        return Err(Error::Configuration(format!(
            "solution of {} values does not match {n_nodes} nodes x {n_fields} fields",
            data.len()
        )));
    }
    writeln!(out, "Size {n_nodes},{n_fields}")?;
    for row in data.chunks_exact(n_fields) {
        let text: Vec<String> = row.iter().map(|&v| cfmt::exp(v, 18, false)).collect();
        writeln!(out, "{}", text.join(","))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_solution_file(
    n_nodes: usize,
    n_fields: usize,
    data: &[f64],
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    write_solution(n_nodes, n_fields, data, create(path)?)?;
    debug!(path = %path.display(), n_nodes, n_fields, "solution written");
    Ok(())
}

/// Read a solution file back.
pub fn read_solution<R: BufRead>(input: R) -> Result<SolutionData> {
    let mut lines = Lines::new(input);
    let size = lines.labelled("Size")?;
    let (n_nodes, n_fields) = size.split_once(',').ok_or_else(|| {
        lines.error(format!("expected \"Size <nodes>,<fields>\", found {size:?}"))
    })?;
    let n_nodes: usize = lines.parse(n_nodes.trim(), "node count")?;
    let n_fields: usize = lines.parse(n_fields.trim(), "field count")?;

    let len = lines.product(n_nodes, n_fields, "solution size")?;
    let mut data = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    for node in 0..n_nodes {
        let text = lines.next("solution row")?;
        let row: Vec<&str> = text.split(',').collect();
        if row.len() != n_fields {
            return Err(lines.error(format!(
                "node {node} has {} values, expected {n_fields}",
                row.len()
            )));
        }
        for value in row {
            data.push(lines.parse::<f64>(value.trim(), "solution value")?);
        }
    }
    Ok(SolutionData {
        n_nodes,
        n_fields,
        data,
    })
}

pub fn read_solution_file(path: impl AsRef<Path>) -> Result<SolutionData> {
    read_solution(open(path.as_ref())?)
}
