//! Turns an OSM PBF file into a pull-based stream of [`Record`]s.
//!
//! Blobs are read and decoded one at a time; only the records of the current
//! primitive block are held in memory. Nodes become points, ways become lines
//! and the first relation ends the stream, since PBF files store relations
//! after all nodes and ways.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use agegrid::{Line, Point, Record};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, warn};
use osmpbf::{BlobDecode, BlobReader, Element, PrimitiveBlock};

type NodeMap = hashbrown::HashMap<i64, [f64; 2], nohash_hasher::BuildNoHashHasher<i64>>;

/// Coordinates of every node seen so far, for ways stored without embedded
/// node locations.
#[derive(Default)]
pub struct NodeIndex {
    nodes: NodeMap,
}

impl NodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn insert(&mut self, id: i64, lon: f64, lat: f64) {
        self.nodes.insert(id, [lon, lat]);
    }

    #[inline]
    pub fn get(&self, id: i64) -> Option<[f64; 2]> {
        self.nodes.get(&id).copied()
    }
}

/// Objects the decoder had to leave out of the stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodeStats {
    /// Nodes and ways without a timestamp in their metadata.
    pub untimestamped: u64,
    /// Ways for which not a single vertex could be located.
    pub unlocated_ways: u64,
    /// Way vertices missing from an otherwise located way.
    pub unlocated_vertices: u64,
}

impl DecodeStats {
    pub fn report(&self) {
        if self.untimestamped > 0 {
            warn!(
                "Skipped {} objects without timestamp (was the file written without metadata?)",
                self.untimestamped
            );
        }

        if self.unlocated_ways > 0 {
            warn!(
                "Skipped {} ways without node locations; run 'osmium add-locations-to-ways' \
                 on the input or pass --index-way-nodes",
                self.unlocated_ways
            );
        }

        if self.unlocated_vertices > 0 {
            warn!(
                "Dropped {} way vertices whose node was not in the input",
                self.unlocated_vertices
            );
        }
    }
}

#[inline]
fn timestamp_from_millis(millis: Option<i64>) -> Option<DateTime<Utc>> {
    millis.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

/// Vertices of a way: its embedded locations when present, otherwise the
/// referenced nodes looked up in `index`. Returns the vertices and the number
/// of references that could not be resolved.
fn way_vertices<L, R>(locations: L, refs: R, index: Option<&NodeIndex>) -> (Vec<[f64; 2]>, u64)
where
    L: Iterator<Item = [f64; 2]>,
    R: Iterator<Item = i64>,
{
    let embedded: Vec<[f64; 2]> = locations.collect();
    if !embedded.is_empty() {
        return (embedded, 0);
    }

    let Some(index) = index else {
        return (Vec::new(), refs.count() as u64);
    };

    let mut missing = 0u64;
    let resolved = refs
        .filter_map(|id| {
            let vertex = index.get(id);
            if vertex.is_none() {
                missing += 1;
            }
            vertex
        })
        .collect();

    (resolved, missing)
}

pub struct PbfRecords<R: Read + Send> {
    blobs: BlobReader<R>,
    pending: std::vec::IntoIter<Record>,
    node_index: Option<NodeIndex>,
    stats: DecodeStats,
    done: bool,
}

impl PbfRecords<BufReader<File>> {
    pub fn open(path: &Path, index_way_nodes: bool) -> Result<Self> {
        let blobs = BlobReader::from_path(path)
            .with_context(|| format!("Unable to open OSM input file {}", path.display()))?;

        Ok(Self::new(blobs, index_way_nodes))
    }
}

impl<R: Read + Send> PbfRecords<R> {
    pub fn new(blobs: BlobReader<R>, index_way_nodes: bool) -> Self {
        Self {
            blobs,
            pending: Vec::new().into_iter(),
            node_index: index_way_nodes.then(NodeIndex::new),
            stats: DecodeStats::default(),
            done: false,
        }
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Nodes held by the way-node index (0 when indexing is off).
    pub fn indexed_nodes(&self) -> usize {
        self.node_index.as_ref().map_or(0, |index| index.nodes.len())
    }

    fn decode_block(&mut self, block: &PrimitiveBlock) -> Vec<Record> {
        let mut records = Vec::new();

        for element in block.elements() {
            let (id, lon, lat, millis) = match element {
                Element::Node(node) => {
                    (node.id(), node.lon(), node.lat(), node.info().milli_timestamp())
                }
                Element::DenseNode(node) => (
                    node.id(),
                    node.lon(),
                    node.lat(),
                    node.info().map(|info| info.milli_timestamp()),
                ),
                Element::Way(way) => {
                    let Some(timestamp) = timestamp_from_millis(way.info().milli_timestamp())
                    else {
                        self.stats.untimestamped += 1;
                        continue;
                    };

                    let (vertices, missing) = way_vertices(
                        way.node_locations().map(|loc| [loc.lon(), loc.lat()]),
                        way.refs(),
                        self.node_index.as_ref(),
                    );

                    if vertices.is_empty() {
                        self.stats.unlocated_ways += 1;
                        continue;
                    }

                    self.stats.unlocated_vertices += missing;
                    records.push(Record::Line(Line {
                        timestamp,
                        vertices,
                    }));
                    continue;
                }
                Element::Relation(_) => {
                    records.push(Record::Area);
                    self.done = true;
                    break;
                }
            };

            if let Some(index) = self.node_index.as_mut() {
                index.insert(id, lon, lat);
            }

            match timestamp_from_millis(millis) {
                Some(timestamp) => records.push(Record::Point(Point {
                    lon,
                    lat,
                    timestamp,
                })),
                None => self.stats.untimestamped += 1,
            }
        }

        records
    }
}

impl<R: Read + Send> Iterator for PbfRecords<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.next() {
                return Some(Ok(record));
            }

            if self.done {
                return None;
            }

            let blob = match self.blobs.next()? {
                Ok(blob) => blob,
                Err(err) => {
                    self.done = true;
                    return Some(Err(anyhow::Error::new(err).context("Unable to read OSM blob")));
                }
            };

            match blob.decode() {
                Ok(BlobDecode::OsmData(block)) => {
                    let records = self.decode_block(&block);
                    self.pending = records.into_iter();
                }
                Ok(BlobDecode::OsmHeader(_)) => debug!("Skipping OSM header blob"),
                Ok(BlobDecode::Unknown(kind)) => debug!("Skipping unknown blob type {kind}"),
                Err(err) => {
                    self.done = true;
                    return Some(Err(anyhow::Error::new(err).context("Unable to decode OSM blob")));
                }
            }
        }
    }
}
