use bitflags::bitflags;

bitflags! {
    /// Equipment slots an item can occupy.
    ///
    /// Relayed events carry a slot filter so only items worn in matching slots
    /// receive them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SlotFlags: u16 {
        const HEAD          = 1 << 0;
        const EYES          = 1 << 1;
        const EARS          = 1 << 2;
        const MASK          = 1 << 3;
        const OUTERCLOTHING = 1 << 4;
        const INNERCLOTHING = 1 << 5;
        const NECK          = 1 << 6;
        const BACK          = 1 << 7;
        const BELT          = 1 << 8;
        const GLOVES        = 1 << 9;
        const IDCARD        = 1 << 10;
        const POCKET        = 1 << 11;
        const LEGS          = 1 << 12;
        const FEET          = 1 << 13;
        const SUITSTORAGE   = 1 << 14;
    }
}
