use std::fmt;

use a5xx_pm4::pm4::DiPrimType;

/// Primitive topology of a draw request, as handed down by the API layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Quads,
    QuadStrip,
    Polygon,
    LinesAdjacency,
    LineStripAdjacency,
    TrianglesAdjacency,
    TriangleStripAdjacency,
    Patches,
}

impl fmt::Display for PrimitiveTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveTopology::Points => "points",
            PrimitiveTopology::Lines => "lines",
            PrimitiveTopology::LineLoop => "line_loop",
            PrimitiveTopology::LineStrip => "line_strip",
            PrimitiveTopology::Triangles => "triangles",
            PrimitiveTopology::TriangleStrip => "triangle_strip",
            PrimitiveTopology::TriangleFan => "triangle_fan",
            PrimitiveTopology::Quads => "quads",
            PrimitiveTopology::QuadStrip => "quad_strip",
            PrimitiveTopology::Polygon => "polygon",
            PrimitiveTopology::LinesAdjacency => "lines_adjacency",
            PrimitiveTopology::LineStripAdjacency => "line_strip_adjacency",
            PrimitiveTopology::TrianglesAdjacency => "triangles_adjacency",
            PrimitiveTopology::TriangleStripAdjacency => "triangle_strip_adjacency",
            PrimitiveTopology::Patches => "patches",
        };
        f.write_str(s)
    }
}

impl PrimitiveTopology {
    /// Hardware primitive type, or `None` when the CP cannot draw it directly
    /// (the API layer is expected to convert those before they get here).
    pub fn hw_prim(self) -> Option<DiPrimType> {
        Some(match self {
            PrimitiveTopology::Points => DiPrimType::PointList,
            PrimitiveTopology::Lines => DiPrimType::LineList,
            PrimitiveTopology::LineLoop => DiPrimType::LineLoop,
            PrimitiveTopology::LineStrip => DiPrimType::LineStrip,
            PrimitiveTopology::Triangles => DiPrimType::TriList,
            PrimitiveTopology::TriangleStrip => DiPrimType::TriStrip,
            PrimitiveTopology::TriangleFan => DiPrimType::TriFan,
            PrimitiveTopology::LinesAdjacency => DiPrimType::LineAdj,
            PrimitiveTopology::LineStripAdjacency => DiPrimType::LineStripAdj,
            PrimitiveTopology::TrianglesAdjacency => DiPrimType::TriAdj,
            PrimitiveTopology::TriangleStripAdjacency => DiPrimType::TriStripAdj,
            PrimitiveTopology::Quads
            | PrimitiveTopology::QuadStrip
            | PrimitiveTopology::Polygon
            | PrimitiveTopology::Patches => return None,
        })
    }
}
