//! Mesh build error types.

use std::fmt;

/// Attribute channel of a face corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeChannel {
    Position,
    Texcoord,
    Normal,
}

impl fmt::Display for AttributeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => write!(f, "position"),
            Self::Texcoord => write!(f, "texcoord"),
            Self::Normal => write!(f, "normal"),
        }
    }
}

/// Errors that abort a mesh build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshBuildError {
    /// A face corner has no index for one of its attribute channels.
    MissingAttribute {
        corner: usize,
        channel: AttributeChannel,
    },
    /// A face corner references an attribute past the end of its pool.
    AttributeOutOfRange {
        corner: usize,
        channel: AttributeChannel,
        index: u32,
    },
    /// A face corner's normal does not classify to an axis direction.
    InvalidNormal { corner: usize },
    /// More unique vertices than 16-bit indices can address.
    TooManyVertices { count: usize },
    /// More face corners than a 16-bit index buffer may hold.
    TooManyIndices { count: usize },
    /// The corner stream is empty.
    Empty,
}

impl fmt::Display for MeshBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAttribute { corner, channel } => {
                write!(f, "missing {channel} data at corner {corner}")
            }
            Self::AttributeOutOfRange {
                corner,
                channel,
                index,
            } => write!(f, "{channel} index {index} out of range at corner {corner}"),
            Self::InvalidNormal { corner } => {
                write!(f, "normal at corner {corner} is not axis aligned")
            }
            Self::TooManyVertices { count } => {
                write!(f, "{count} unique vertices exceed the 16-bit index limit")
            }
            Self::TooManyIndices { count } => {
                write!(f, "{count} indices exceed the 16-bit index limit")
            }
            Self::Empty => write!(f, "mesh has no face corners"),
        }
    }
}

impl std::error::Error for MeshBuildError {}
