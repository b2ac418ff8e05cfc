// Two security tiers:
// public (no auth: login, health) and protected (bearer token required: /api/*)
pub mod protected;
pub mod public;
