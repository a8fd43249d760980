//! Closed enumerations for surfaces and channel roles.
//!
//! The two surface variants carry different sensor sets; which formulas
//! apply to a surface is decided by its `SurfaceLayout`, never by string
//! lookup.

/// One physical sensing platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Left,
    Right,
}

impl Surface {
    pub const BOTH: [Surface; 2] = [Surface::Left, Surface::Right];

    pub fn name(self) -> &'static str {
        match self {
            Surface::Left => "left",
            Surface::Right => "right",
        }
    }
}

/// One scalar sensor signal on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    // Six-axis force/moment transducer (plus the vendor padding channel)
    Fx,
    Fy,
    Fz,
    Mx,
    My,
    Mz,
    Zero,
    // Corner load cells
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl ChannelRole {
    pub fn name(self) -> &'static str {
        match self {
            ChannelRole::Fx => "f_x",
            ChannelRole::Fy => "f_y",
            ChannelRole::Fz => "f_z",
            ChannelRole::Mx => "m_x",
            ChannelRole::My => "m_y",
            ChannelRole::Mz => "m_z",
            ChannelRole::Zero => "zero",
            ChannelRole::FrontLeft => "frontleft",
            ChannelRole::FrontRight => "frontright",
            ChannelRole::BackLeft => "backleft",
            ChannelRole::BackRight => "backright",
        }
    }
}

const SIX_AXIS_ROLES: [ChannelRole; 7] = [
    ChannelRole::Fx,
    ChannelRole::Fy,
    ChannelRole::Fz,
    ChannelRole::Mx,
    ChannelRole::My,
    ChannelRole::Mz,
    ChannelRole::Zero,
];

const FOUR_CORNER_ROLES: [ChannelRole; 4] = [
    ChannelRole::FrontLeft,
    ChannelRole::FrontRight,
    ChannelRole::BackLeft,
    ChannelRole::BackRight,
];

const SIX_AXIS_LOAD: [ChannelRole; 1] = [ChannelRole::Fz];

/// Sensor variant of a surface pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceLayout {
    SixAxis,
    FourCorner,
}

impl SurfaceLayout {
    /// All channel roles streamed for this layout, in stream order.
    pub fn roles(self) -> &'static [ChannelRole] {
        match self {
            SurfaceLayout::SixAxis => &SIX_AXIS_ROLES,
            SurfaceLayout::FourCorner => &FOUR_CORNER_ROLES,
        }
    }

    /// Roles that contribute to the synthetic mean-load series.
    ///
    /// The six-axis variant only has one vertical force signal; corner
    /// cells all carry vertical load.
    pub fn load_roles(self) -> &'static [ChannelRole] {
        match self {
            SurfaceLayout::SixAxis => &SIX_AXIS_LOAD,
            SurfaceLayout::FourCorner => &FOUR_CORNER_ROLES,
        }
    }

    /// Whether the lateral / anterior-posterior ratios are defined.
    /// Only corner cells resolve load position on the plate.
    pub fn supports_balance_ratios(self) -> bool {
        matches!(self, SurfaceLayout::FourCorner)
    }

    /// Index of `role` within `roles()`, if it belongs to this layout.
    pub fn role_index(self, role: ChannelRole) -> Option<usize> {
        self.roles().iter().position(|r| *r == role)
    }
}
