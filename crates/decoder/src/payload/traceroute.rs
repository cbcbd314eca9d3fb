//! `TRACEROUTE_APP` decoder.

use super::{decode_message, DecodeContext};
use crate::error::DecodeResult;
use crate::packet::Traceroute;
use crate::resolver::resolve;
use meshtastic::protobufs::RouteDiscovery;

/// Decode a route discovery reply into resolved node ids, ordered
/// destination first, then the recorded intermediate hops, then the source.
pub fn decode(ctx: &DecodeContext<'_>) -> DecodeResult<Traceroute> {
    let discovery: RouteDiscovery = decode_message(ctx.payload())?;

    let mut route = Vec::with_capacity(discovery.route.len() + 2);
    route.push(resolve(ctx.envelope.to, ctx.nodes));
    route.extend(discovery.route.iter().map(|&num| resolve(num, ctx.nodes)));
    route.push(resolve(ctx.envelope.from, ctx.nodes));

    Ok(Traceroute { route })
}
