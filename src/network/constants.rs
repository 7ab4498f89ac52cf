//! C3 network constants - default values for every tunable
//!
//! Ceilings count OTHER members, never the host itself.

// Hierarchical admission ceilings
pub const LANCE_CEILING: u32 = 3;
pub const COMMAND_CEILING: u32 = 2;

// Mesh admission ceilings
pub const LARGE_MESH_CEILING: u32 = 5; // Information and Naval meshes (6 units total)
pub const SMALL_MESH_CEILING: u32 = 2; // Reconfigurable mesh (3 units total)

// Naval mesh endpoints must be within this many hexes of each other
pub const NAVAL_LINK_RANGE: u32 = 60;

// Subordinate -> master -> coordinator loop; never more hops than this
pub const MAX_HIERARCHY_DEPTH: usize = 2;

// Raw master links followed when validating one link
pub const MAX_LINK_CHAIN: usize = 64;

// Pairwise evaluation goes parallel above this roster size
pub const PARALLEL_THRESHOLD: usize = 256;
