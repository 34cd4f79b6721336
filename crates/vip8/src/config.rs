use typed_builder::TypedBuilder;

/// How `DXYN` treats sprite pixels that fall past the screen edges.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SpritePolicy {
    /// Pixels past an edge reappear on the opposite side.
    #[default]
    Wrap,
    /// The start coordinate wraps onto the screen, pixels past the right or
    /// bottom edge are discarded.
    Clip,
}

/// Construction-time options for a [`crate::Machine`].
///
/// ```
/// use vip8::{Machine, MachineConfig, SpritePolicy};
///
/// let config = MachineConfig::builder()
///     .seed(42)
///     .sprite_policy(SpritePolicy::Clip)
///     .build();
/// let machine = Machine::new(config);
/// assert_eq!(machine.pc(), 0x200);
/// ```
#[derive(Clone, Debug, Default, TypedBuilder)]
pub struct MachineConfig {
    /// Seed for `CXNN`. Without one the generator is seeded from OS entropy.
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
    #[builder(default)]
    pub sprite_policy: SpritePolicy,
}
