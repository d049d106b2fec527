use uuid::Uuid;

/// Stall-level switches. A `None` means the merchant never set the flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StallFlags {
    pub accept_new_orders: Option<bool>,
    pub enable_digital_menu: Option<bool>,
    pub enable_delivery: Option<bool>,
    pub enable_dine_in: Option<bool>,
    pub enable_digital_payment: Option<bool>,
}

impl StallFlags {
    pub fn accepts_orders(&self) -> bool {
        self.accept_new_orders.unwrap_or(false)
    }

    pub fn digital_menu_enabled(&self) -> bool {
        self.enable_digital_menu.unwrap_or(true)
    }

    pub fn delivery_enabled(&self) -> bool {
        self.enable_delivery.unwrap_or(true)
    }

    pub fn dine_in_enabled(&self) -> bool {
        self.enable_dine_in.unwrap_or(true)
    }

    pub fn digital_payment_enabled(&self) -> bool {
        self.enable_digital_payment.unwrap_or(false)
    }

    /// Overlays the flags that are set in `patch`.
    pub fn merge(&mut self, patch: &StallFlags) {
        fn pick(slot: &mut Option<bool>, value: Option<bool>) {
            if value.is_some() {
                *slot = value;
            }
        }
        pick(&mut self.accept_new_orders, patch.accept_new_orders);
        pick(&mut self.enable_digital_menu, patch.enable_digital_menu);
        pick(&mut self.enable_delivery, patch.enable_delivery);
        pick(&mut self.enable_dine_in, patch.enable_dine_in);
        pick(&mut self.enable_digital_payment, patch.enable_digital_payment);
    }
}

#[derive(Debug, Clone)]
pub struct Stall {
    pub id: Uuid,
    pub stall_name: String,
    pub flags: StallFlags,
}
