use serde::{Deserialize, Serialize};

/// Индекс вершины в массиве вершин меша
pub type VertexId = u32;

// ── Геометрия ──

/// Вершина меша: позиция, нормаль, текстурные координаты
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    #[serde(default = "default_normal")]
    pub normal: [f32; 3],
    #[serde(default)]
    pub uv: [f32; 2],
}

fn default_normal() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// Вершина в точке с нормалью по умолчанию (+Z) и нулевыми UV
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            normal: default_normal(),
            uv: [0.0, 0.0],
        }
    }
}

/// Индексированный треугольный меш (тройки индексов = треугольники)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<VertexId>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<VertexId>) -> Self {
        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Индексы треугольника `tri` (None, если индекс вне диапазона)
    pub fn triangle(&self, tri: usize) -> Option<[VertexId; 3]> {
        let base = tri.checked_mul(3)?;
        let slice = self.indices.get(base..base + 3)?;
        Some([slice[0], slice[1], slice[2]])
    }

    /// Итератор по всем треугольникам
    pub fn triangles(&self) -> impl Iterator<Item = [VertexId; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
    }
}

// ── Режимы редактора ──

/// Режим выделения (активен ровно один)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Vertex,
    Edge,
    Face,
    Quad,
}

impl SelectionMode {
    /// Все режимы в порядке переключения
    pub fn all() -> &'static [SelectionMode] {
        &[
            SelectionMode::Vertex,
            SelectionMode::Edge,
            SelectionMode::Face,
            SelectionMode::Quad,
        ]
    }
}

/// Ось гизмо
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    /// Индекс компоненты вектора (0, 1, 2)
    pub fn index(self) -> usize {
        match self {
            GizmoAxis::X => 0,
            GizmoAxis::Y => 1,
            GizmoAxis::Z => 2,
        }
    }
}

/// Операция гизмо
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GizmoOp {
    #[default]
    Move,
    Scale,
    Rotate,
}

// ── Сценарии ──

/// Примитив для начального меша сценария
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    /// Куб с дублированными вершинами на каждой грани (как после импорта OBJ)
    Cube { size: f32 },
    /// Плоская сетка квадов в плоскости XY с общими вершинами
    Grid {
        columns: u32,
        rows: u32,
        #[serde(default = "default_cell_size")]
        cell_size: f32,
    },
    /// Один квад из двух треугольников
    Quad { size: f32 },
}

fn default_cell_size() -> f32 {
    1.0
}

/// Сценарий редактирования: начальный меш и список команд
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditScript {
    /// Явно заданный меш (имеет приоритет над примитивом)
    #[serde(default)]
    pub mesh: Option<MeshData>,
    #[serde(default)]
    pub primitive: Option<Primitive>,
    /// Команды в JSON-формате протокола редактора
    #[serde(default)]
    pub commands: Vec<serde_json::Value>,
}

impl EditScript {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid script JSON: {e}"))
    }
}
