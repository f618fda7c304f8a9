use clap::Parser;

use hex_fog::fog::FogConfig;

/// Command-line overrides for the fog surface configuration.
#[derive(Parser, Debug)]
#[command(name = "hex-fog", version, about = "Fog-of-war triangle lattice viewer")]
pub struct Args {
    /// Triangles per lattice row.
    #[arg(long)]
    pub columns: Option<u32>,
    /// Number of lattice rows.
    #[arg(long)]
    pub rows: Option<u32>,
    /// Triangle circumradius.
    #[arg(long)]
    pub radius: Option<f32>,
    /// Side length of a quadrant.
    #[arg(long)]
    pub quadrant_size: Option<f32>,
    /// Quadrant grid columns.
    #[arg(long)]
    pub quadrant_columns: Option<u32>,
    /// Quadrant grid rows.
    #[arg(long)]
    pub quadrant_rows: Option<u32>,
    /// Asset directory holding `<scan>.png` and `<scan>_n.png` per quadrant,
    /// plus a shared `fog.png`.
    #[arg(long)]
    pub texture_dir: Option<String>,
}

impl Args {
    /// Applies the given overrides on top of [`FogConfig::default`].
    pub fn into_config(self) -> FogConfig {
        let mut cfg = FogConfig::default();
        if let Some(v) = self.columns {
            cfg.lattice.columns = v;
        }
        if let Some(v) = self.rows {
            cfg.lattice.rows = v;
        }
        if let Some(v) = self.radius {
            cfg.lattice.radius = v;
        }
        if let Some(v) = self.quadrant_size {
            cfg.quadrants.size = v;
        }
        if let Some(v) = self.quadrant_columns {
            cfg.quadrants.columns = v;
        }
        if let Some(v) = self.quadrant_rows {
            cfg.quadrants.rows = v;
        }
        if let Some(dir) = self.texture_dir {
            let dir = dir.trim_end_matches('/');
            let count = (cfg.quadrants.columns * cfg.quadrants.rows) as usize;
            cfg.textures.albedo = (0..count).map(|i| format!("{dir}/{i}.png")).collect();
            cfg.textures.normal = (0..count).map(|i| format!("{dir}/{i}_n.png")).collect();
            cfg.textures.fog = Some(format!("{dir}/fog.png"));
        }
        cfg
    }
}
