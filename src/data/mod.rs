/// Data layer: core types and trace loading.
///
/// Architecture:
/// ```text
///  <prefix>-TcpCubic-1flows-sock0-cwnd.dat
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  "<time> <cwnd>" lines → Series (bad lines skipped)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Series   │  Vec<Sample>, file order
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
