use std::net::{IpAddr, SocketAddr};

const DEFAULT_CLUSTER_PALETTE: [&str; 20] = [
    "#EF4444", "#F59E0B", "#10B981", "#3B82F6", "#6366F1", "#8B5CF6", "#EC4899", "#F97316",
    "#84CC16", "#06B6D4", "#14B8A6", "#64748B", "#A855F7", "#D946EF", "#F43F5E", "#EAB308",
    "#22C55E", "#0EA5E9", "#4F46E5", "#C026D3",
];

/// How `apply clusters` names and colors the lists it creates.
#[derive(Debug, Clone)]
pub struct ReorganizeConfig {
    pub list_prefix: String,
    pub palette: Vec<String>,
}

impl Default for ReorganizeConfig {
    fn default() -> Self {
        Self {
            list_prefix: "Geographic Group".to_string(),
            palette: DEFAULT_CLUSTER_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ReorganizeConfig {
    pub fn color_for(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return crate::models::DEFAULT_LIST_COLOR;
        }
        &self.palette[index % self.palette.len()]
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub addr: SocketAddr,
    pub reorganize: ReorganizeConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:data.db?mode=rwc".to_string());

        let host: IpAddr = std::env::var("HOST")
            .unwrap_or_else(|_| "127.0.0.1".into())
            .parse()?;
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()?;

        let mut reorganize = ReorganizeConfig::default();
        if let Ok(prefix) = std::env::var("CLUSTER_LIST_PREFIX") {
            if !prefix.trim().is_empty() {
                reorganize.list_prefix = prefix.trim().to_string();
            }
        }
        if let Ok(palette) = std::env::var("CLUSTER_PALETTE") {
            let colors: Vec<String> = palette
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
            if !colors.is_empty() {
                reorganize.palette = colors;
            }
        }

        Ok(Self {
            database_url,
            addr: SocketAddr::new(host, port),
            reorganize,
        })
    }
}
